//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// World configuration parameters.
///
/// All randomness in a run flows from `seed`, so two environments built from
/// an identical config reproduce the same trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid extent; valid coordinates span `[0, size]` on both axes
    pub size: i32,
    /// Number of organisms spawned at world creation
    pub organism_count: usize,
    /// Fraction of the grid seeded with food at world creation (0.0 to 1.0)
    pub food_density: f64,
    /// Inject new food at each day boundary
    pub regrowth_enabled: bool,
    /// Food items injected per day boundary when regrowth is enabled
    pub regrowth_rate: usize,
    /// Whether food items count down and expire
    pub food_decay_enabled: bool,
    /// Steps per simulated day
    pub steps_per_day: u64,
    /// Default run length in days when the caller does not pass one
    pub default_days: u64,
    /// Upper bound on litter size per birth (lower bound is 1)
    pub litter_max: usize,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: 100,
            organism_count: 20,
            food_density: 0.10,
            regrowth_enabled: true,
            regrowth_rate: 5,
            food_decay_enabled: true,
            steps_per_day: 20,
            default_days: 20,
            litter_max: 1,
            seed: 0,
        }
    }
}

impl WorldConfig {
    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.size <= 0 {
            return Err(Error::Validation(format!(
                "grid size must be positive, got {}",
                self.size
            )));
        }
        if !(0.0..=1.0).contains(&self.food_density) {
            return Err(Error::Validation(format!(
                "food density must be within [0, 1], got {}",
                self.food_density
            )));
        }
        if self.steps_per_day == 0 {
            return Err(Error::Validation(
                "steps_per_day must be at least 1".to_string(),
            ));
        }
        if self.litter_max == 0 {
            return Err(Error::Validation(
                "litter_max must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimum age (in steps) before an organism may conceive.
    pub fn maturity_steps(&self) -> u64 {
        5 * self.steps_per_day
    }

    /// Length of a pregnancy in steps.
    pub fn pregnancy_steps(&self) -> u64 {
        2 * self.steps_per_day
    }

    /// Minimum number of steps between two births of the same organism.
    pub fn birth_spacing_steps(&self) -> u64 {
        2 * self.steps_per_day
    }

    /// Number of food items seeded at world creation.
    pub fn initial_food_count(&self) -> usize {
        (self.size as f64 * self.size as f64 * self.food_density) as usize
    }
}
