//! Per-step census of population and food counts.

use serde::{Deserialize, Serialize};

/// Append-only time series of population size and food count.
///
/// One entry is recorded per step, before that step's mutations, so the
/// series describes the world as each step began. Export collaborators read
/// it for charting; the simulation never consumes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CensusLog {
    population: Vec<usize>,
    food: Vec<usize>,
}

impl CensusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, population: usize, food: usize) {
        self.population.push(population);
        self.food.push(food);
    }

    pub fn population(&self) -> &[usize] {
        &self.population
    }

    pub fn food(&self) -> &[usize] {
        &self.food
    }

    /// Number of steps recorded so far.
    pub fn len(&self) -> usize {
        self.population.len()
    }

    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// The most recent `(population, food)` pair, if any step has run.
    pub fn latest(&self) -> Option<(usize, usize)> {
        match (self.population.last(), self.food.last()) {
            (Some(&p), Some(&f)) => Some((p, f)),
            _ => None,
        }
    }
}
