//! World state and the per-step scheduler.
//!
//! The environment owns every entity and drives the fixed update order: all
//! organisms first (metabolism, movement/eating, reproduction), then all food
//! (aging, decay, pollination). A day is `steps_per_day` steps; the day
//! boundary removes stragglers and optionally regrows food.

use crate::control::ControlHandle;
use crate::food::{self, Food};
use crate::grid;
use crate::index::{EntityRef, SpatialIndex};
use crate::organism::{self, Organism};
use crate::snapshot::{EnvironmentSummary, FoodSnapshot, OrganismSnapshot, WorldSnapshot};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, trace};
use verdant_core::{CensusLog, Coordinate, Direction, FoodId, OrganismId, Result, WorldConfig};

/// Attempts made to find a random free cell before giving up on a placement.
const PLACEMENT_RETRIES: usize = 100;

/// Scheduler state. Pause is a suspend-only overlay: `run_step` mutates
/// nothing unless the environment is `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Paused,
    Ended,
}

/// The world: grid occupancy, all live entities, counters, and the RNG every
/// random draw flows through.
///
/// Entities live in `BTreeMap`s keyed by monotonically allocated ids, so
/// iteration order is insertion order and a seeded run is reproducible.
pub struct Environment {
    config: WorldConfig,
    organisms: BTreeMap<OrganismId, Organism>,
    food: BTreeMap<FoodId, Food>,
    index: SpatialIndex,
    rng: ChaCha8Rng,
    day: u64,
    steps_today: u64,
    total_steps: u64,
    day_complete: bool,
    state: RunState,
    census: CensusLog,
    next_organism_id: u64,
    next_food_id: u64,
}

impl Environment {
    /// Build a world: validate the config, scatter the starting population,
    /// and seed the initial food batch (already mature, so the first days
    /// are survivable).
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut env = Self {
            organisms: BTreeMap::new(),
            food: BTreeMap::new(),
            index: SpatialIndex::new(),
            rng,
            day: 0,
            steps_today: 0,
            total_steps: 0,
            day_complete: false,
            state: RunState::Running,
            census: CensusLog::new(),
            next_organism_id: 0,
            next_food_id: 0,
            config,
        };

        for _ in 0..env.config.organism_count {
            if let Some(cell) = env.random_free_cell() {
                env.insert_organism_at(cell, 0);
            }
        }
        env.populate_food(env.config.initial_food_count(), food::MATURITY_AGE + 1);

        info!(
            event = "environment_created",
            size = env.config.size,
            organisms = env.organisms.len(),
            food = env.food.len(),
            seed = env.config.seed,
            "environment created"
        );
        Ok(env)
    }

    /// Run one simulation step. No-op unless the scheduler is `Running`.
    pub fn run_step(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        self.total_steps += 1;
        self.steps_today += 1;
        // Counts as the step begins, before any of this step's mutations.
        self.census.record(self.organisms.len(), self.food.len());

        // Snapshot of ids at step start: entities removed mid-pass are
        // skipped, entities born mid-pass act starting next step.
        let organism_ids: Vec<OrganismId> = self.organisms.keys().copied().collect();
        for id in organism_ids {
            self.update_organism(id);
        }

        let food_ids: Vec<FoodId> = self.food.keys().copied().collect();
        for id in food_ids {
            self.update_food(id);
        }

        if self.steps_today >= self.config.steps_per_day {
            self.day_complete = true;
        }
    }

    /// Close out the day: defensively drop any organism at zero health,
    /// advance the day counter, and reset the step-of-day state.
    pub fn end_day(&mut self) {
        let stragglers: Vec<OrganismId> = self
            .organisms
            .iter()
            .filter(|(_, o)| !o.is_alive())
            .map(|(id, _)| *id)
            .collect();
        for id in stragglers {
            if let Some(organism) = self.organisms.remove(&id) {
                self.index.remove_organism(organism.position, id);
            }
        }

        self.day += 1;
        self.steps_today = 0;
        self.day_complete = false;
        info!(
            event = "day_complete",
            day = self.day,
            population = self.organisms.len(),
            food = self.food.len(),
            "day rolled over"
        );
    }

    /// Open the new day: regrow food if enabled.
    pub fn begin_day(&mut self) {
        if self.config.regrowth_enabled {
            self.add_food(self.config.regrowth_rate);
        }
    }

    /// Inject `count` fresh food items at random free cells. Cells that
    /// cannot be found within the retry bound are skipped.
    pub fn add_food(&mut self, count: usize) {
        let mut placed = 0;
        for _ in 0..count {
            if let Some(cell) = self.random_free_cell() {
                self.insert_food_at(cell, 1, 0);
                placed += 1;
            }
        }
        debug!(
            event = "food_regrown",
            requested = count,
            placed,
            day = self.day,
            "food injected"
        );
    }

    /// Drive the simulation until `day_limit` days have elapsed (`0` means
    /// run indefinitely), the control handle requests a stop, or the
    /// environment has already ended. The stop flag is checked once per step
    /// boundary; while paused the loop yields without mutating anything.
    pub fn simulate(&mut self, day_limit: u64, control: &ControlHandle) {
        if self.state == RunState::Ended {
            return;
        }
        let target = if day_limit == 0 { u64::MAX } else { day_limit };
        info!(
            event = "simulation_started",
            day_limit,
            seed = self.config.seed,
            population = self.organisms.len(),
            food = self.food.len(),
            "simulation started"
        );

        while self.day < target {
            if control.stop_requested() {
                break;
            }
            if control.is_paused() || self.state == RunState::Paused {
                std::thread::yield_now();
                continue;
            }
            self.run_step();
            if self.day_complete {
                self.end_day();
                self.begin_day();
            }
        }

        self.state = RunState::Ended;
        info!(
            event = "simulation_ended",
            day = self.day,
            total_steps = self.total_steps,
            population = self.organisms.len(),
            food = self.food.len(),
            "simulation ended"
        );
    }

    /// `simulate` with the configured default run length.
    pub fn simulate_default(&mut self, control: &ControlHandle) {
        self.simulate(self.config.default_days, control)
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
        }
    }

    // ---- per-entity updates -------------------------------------------------

    fn update_organism(&mut self, id: OrganismId) {
        let Some(organism) = self.organisms.get_mut(&id) else {
            return;
        };
        if !organism.metabolize() {
            self.kill_organism(id);
            return;
        }
        self.move_and_eat(id);

        let maturity = self.config.maturity_steps();
        let spacing = self.config.birth_spacing_steps();
        let gestation = self.config.pregnancy_steps();
        let total_steps = self.total_steps;

        let Some(organism) = self.organisms.get_mut(&id) else {
            return;
        };
        if organism.is_pregnant {
            organism.steps_pregnant += 1;
        }
        if !organism.is_pregnant
            && organism.age > maturity
            && total_steps - organism.last_birth_step > spacing
            && self.rng.gen_range(0..=10) < organism::CONCEPTION_CHANCE
        {
            organism.conceive();
            debug!(
                event = "conception",
                organism = %id,
                age = organism.age,
                "organism became pregnant"
            );
        }
        let due = organism.is_pregnant && organism.steps_pregnant >= gestation;
        if due {
            self.give_birth(id);
        }
    }

    /// Random walk with eating: `speed` sub-steps, each re-rolling the
    /// heading, wrapping across the seam, and consuming any food on the
    /// landing cell.
    fn move_and_eat(&mut self, id: OrganismId) {
        let size = self.config.size;
        let Some(organism) = self.organisms.get(&id) else {
            return;
        };
        let speed = organism.speed;

        for _ in 0..speed {
            let facing = Direction::random(&mut self.rng);
            let Some(organism) = self.organisms.get_mut(&id) else {
                return;
            };
            organism.facing = facing;
            let from = organism.position;
            let (dx, dy) = facing.delta();
            let to = from.offset(dx, dy).wrap(size);
            organism.position = to;
            self.index.move_organism(from, to, id);

            if let Some(food_id) = self.index.food_at(to) {
                if let Some(eaten) = self.food.remove(&food_id) {
                    self.index.remove_food(to, food_id);
                    let value = eaten.nutrition_value();
                    if let Some(organism) = self.organisms.get_mut(&id) {
                        organism.adjust_hunger(value);
                    }
                    trace!(
                        event = "food_eaten",
                        organism = %id,
                        food = %food_id,
                        value,
                        "food consumed"
                    );
                }
            }
        }
    }

    /// Remove a dead organism and leave a corpse behind as fresh food.
    /// Safe to call at most once per organism; a second call is a no-op.
    fn kill_organism(&mut self, id: OrganismId) {
        let Some(organism) = self.organisms.remove(&id) else {
            return;
        };
        self.index.remove_organism(organism.position, id);
        debug!(
            event = "organism_death",
            organism = %id,
            age = organism.age,
            generation = organism.generation,
            day = self.day,
            "organism died"
        );
        self.deposit_food(organism.position);
    }

    /// Resolve a due pregnancy. Pregnancy state always clears; with enough
    /// health the litter is placed on free neighboring cells, otherwise the
    /// body reabsorbs it as a food deposit.
    fn give_birth(&mut self, id: OrganismId) {
        let size = self.config.size;
        let litter_max = self.config.litter_max;
        let total_steps = self.total_steps;

        let Some(parent) = self.organisms.get_mut(&id) else {
            return;
        };
        parent.deliver(total_steps);
        let position = parent.position;
        let child_generation = parent.generation + 1;

        if parent.health > organism::HEALTHY_BIRTH_THRESHOLD {
            parent.adjust_health(-organism::BIRTH_HEALTH_COST);
            let litter = self.rng.gen_range(1..=litter_max);

            let index = &self.index;
            let rng = &mut self.rng;
            let spots =
                grid::sample_distinct_neighbors(rng, position, litter, 1, size, |c| {
                    index.is_free(c)
                });

            let placed = spots.len();
            for spot in spots {
                let child = self.insert_organism_at(spot, child_generation);
                trace!(event = "organism_born", parent = %id, child = %child, "offspring placed");
            }
            debug!(
                event = "birth",
                organism = %id,
                litter,
                placed,
                generation = child_generation,
                day = self.day,
                "organism gave birth"
            );
        } else {
            // Too weak to carry to term; the pregnancy becomes a food deposit.
            parent.adjust_health(-organism::MISCARRIAGE_HEALTH_COST);
            debug!(event = "miscarriage", organism = %id, day = self.day, "pregnancy lost");
            self.deposit_food(position);
            // The deduction can be lethal; zero health never survives a step.
            if self.organisms.get(&id).is_some_and(|o| !o.is_alive()) {
                self.kill_organism(id);
            }
        }
    }

    fn update_food(&mut self, id: FoodId) {
        let Some(item) = self.food.get_mut(&id) else {
            return;
        };
        let spent = item.advance_one_step(self.config.food_decay_enabled);
        if item.wants_pollination() {
            self.pollinate(id);
        }
        if spent {
            self.remove_food(id);
        }
    }

    /// One-shot seed scatter: mark the item pollinated, then try to place a
    /// random number of children on free cells within the seed radius.
    fn pollinate(&mut self, id: FoodId) {
        let size = self.config.size;
        let Some(item) = self.food.get_mut(&id) else {
            return;
        };
        item.pollinated = true;
        let position = item.position;
        let child_generation = item.generation + 1;

        let seeds = self.rng.gen_range(0..=food::MAX_SEEDS) as usize;
        if seeds == 0 {
            return;
        }

        let index = &self.index;
        let rng = &mut self.rng;
        let spots =
            grid::sample_distinct_neighbors(rng, position, seeds, food::SEED_RADIUS, size, |c| {
                index.is_free(c)
            });

        let placed = spots.len();
        for spot in spots {
            self.insert_food_at(spot, child_generation, 0);
        }
        trace!(
            event = "food_pollinated",
            food = %id,
            seeds,
            placed,
            "seeds scattered"
        );
    }

    fn remove_food(&mut self, id: FoodId) {
        if let Some(item) = self.food.remove(&id) {
            self.index.remove_food(item.position, id);
        }
    }

    // ---- placement ----------------------------------------------------------

    /// A corpse or miscarriage becomes food on the spot, unless food is
    /// already there.
    fn deposit_food(&mut self, position: Coordinate) {
        if self.index.food_at(position).is_none() {
            self.insert_food_at(position, 1, 0);
        }
    }

    /// Sample random cells until one is free of both kinds; bounded retries,
    /// `None` on exhaustion.
    fn random_free_cell(&mut self) -> Option<Coordinate> {
        let size = self.config.size;
        for _ in 0..PLACEMENT_RETRIES {
            let cell = Coordinate::new(
                self.rng.gen_range(0..=size),
                self.rng.gen_range(0..=size),
            );
            if self.index.is_free(cell) {
                return Some(cell);
            }
        }
        None
    }

    fn populate_food(&mut self, count: usize, age: u64) {
        for _ in 0..count {
            if let Some(cell) = self.random_free_cell() {
                self.insert_food_at(cell, 1, age);
            }
        }
    }

    fn insert_organism_at(&mut self, position: Coordinate, generation: u32) -> OrganismId {
        let id = OrganismId(self.next_organism_id);
        self.next_organism_id += 1;
        let organism = Organism::new(id, position, &mut self.rng, generation);
        self.index.insert_organism(position, id);
        self.organisms.insert(id, organism);
        id
    }

    fn insert_food_at(&mut self, position: Coordinate, generation: u32, age: u64) -> FoodId {
        let id = FoodId(self.next_food_id);
        self.next_food_id += 1;
        let item = Food::new(id, position, &mut self.rng, generation, age);
        self.index.insert_food(position, id);
        self.food.insert(id, item);
        id
    }

    /// Place an organism at an explicit cell; `None` if the cell is taken.
    /// Scenario setup hook for collaborators and tests.
    pub fn spawn_organism_at(&mut self, position: Coordinate) -> Option<OrganismId> {
        if !position.in_bounds(self.config.size) || !self.index.is_free(position) {
            return None;
        }
        Some(self.insert_organism_at(position, 0))
    }

    /// Place a food item at an explicit cell; `None` if the cell is taken.
    pub fn spawn_food_at(&mut self, position: Coordinate) -> Option<FoodId> {
        if !position.in_bounds(self.config.size) || !self.index.is_free(position) {
            return None;
        }
        Some(self.insert_food_at(position, 1, 0))
    }

    // ---- read-only surface --------------------------------------------------

    /// What occupies a cell, food first, then organisms.
    pub fn entity_at(&self, position: Coordinate) -> Option<EntityRef> {
        self.index.entity_at(position)
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(&id)
    }

    pub fn food_item(&self, id: FoodId) -> Option<&Food> {
        self.food.get(&id)
    }

    pub fn organisms(&self) -> impl Iterator<Item = &Organism> + '_ {
        self.organisms.values()
    }

    pub fn food(&self) -> impl Iterator<Item = &Food> + '_ {
        self.food.values()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn census(&self) -> &CensusLog {
        &self.census
    }

    pub fn day(&self) -> u64 {
        self.day
    }

    pub fn steps_today(&self) -> u64 {
        self.steps_today
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn day_complete(&self) -> bool {
        self.day_complete
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    pub fn summary(&self) -> EnvironmentSummary {
        EnvironmentSummary {
            day: self.day,
            steps_today: self.steps_today,
            total_steps: self.total_steps,
            population: self.organisms.len(),
            food: self.food.len(),
        }
    }

    /// Ordered snapshot for the presentation layer. Read-only; the renderer
    /// never reaches back into the world.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            summary: self.summary(),
            organisms: self.organisms.values().map(OrganismSnapshot::from).collect(),
            food: self.food.values().map(FoodSnapshot::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> WorldConfig {
        WorldConfig {
            size: 10,
            organism_count: 0,
            food_density: 0.0,
            regrowth_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = WorldConfig {
            size: -3,
            ..Default::default()
        };
        assert!(Environment::new(config).is_err());

        let config = WorldConfig {
            food_density: 2.0,
            ..Default::default()
        };
        assert!(Environment::new(config).is_err());
    }

    #[test]
    fn test_initial_population_and_food() {
        let config = WorldConfig {
            size: 30,
            organism_count: 10,
            food_density: 0.05,
            seed: 1,
            ..Default::default()
        };
        let expected_food = config.initial_food_count();
        let env = Environment::new(config).unwrap();
        assert_eq!(env.population(), 10);
        assert_eq!(env.food_count(), expected_food);
        // The opening batch is mature, not sprouts.
        assert!(env.food().all(|f| f.is_mature()));
    }

    #[test]
    fn test_step_and_day_counters() {
        let mut env = Environment::new(quiet_config()).unwrap();
        for _ in 0..19 {
            env.run_step();
        }
        assert!(!env.day_complete());
        assert_eq!(env.steps_today(), 19);
        env.run_step();
        assert!(env.day_complete());
        env.end_day();
        assert_eq!(env.day(), 1);
        assert_eq!(env.steps_today(), 0);
        assert!(!env.day_complete());
        assert_eq!(env.total_steps(), 20);
    }

    #[test]
    fn test_begin_day_regrows_food() {
        let mut config = quiet_config();
        config.regrowth_enabled = true;
        config.regrowth_rate = 5;
        let mut env = Environment::new(config).unwrap();
        assert_eq!(env.food_count(), 0);
        env.begin_day();
        assert_eq!(env.food_count(), 5);
    }

    #[test]
    fn test_census_records_pre_step_counts() {
        let mut env = Environment::new(quiet_config()).unwrap();
        env.spawn_organism_at(Coordinate::new(5, 5)).unwrap();
        env.run_step();
        env.run_step();
        assert_eq!(env.census().len(), 2);
        assert_eq!(env.census().population(), &[1, 1]);
        assert_eq!(env.census().food(), &[0, 0]);
    }

    #[test]
    fn test_entity_at_prefers_food() {
        let mut env = Environment::new(quiet_config()).unwrap();
        let food_cell = Coordinate::new(2, 2);
        let organism_cell = Coordinate::new(7, 7);
        let food_id = env.spawn_food_at(food_cell).unwrap();
        let organism_id = env.spawn_organism_at(organism_cell).unwrap();

        assert_eq!(env.entity_at(food_cell), Some(EntityRef::Food(food_id)));
        assert_eq!(
            env.entity_at(organism_cell),
            Some(EntityRef::Organism(organism_id))
        );
        assert_eq!(env.entity_at(Coordinate::new(0, 9)), None);
    }

    #[test]
    fn test_explicit_spawn_rejects_occupied_or_out_of_bounds() {
        let mut env = Environment::new(quiet_config()).unwrap();
        let cell = Coordinate::new(4, 4);
        assert!(env.spawn_food_at(cell).is_some());
        assert!(env.spawn_food_at(cell).is_none());
        assert!(env.spawn_organism_at(cell).is_none());
        assert!(env.spawn_organism_at(Coordinate::new(11, 0)).is_none());
        assert!(env.spawn_food_at(Coordinate::new(-1, 0)).is_none());
    }

    #[test]
    fn test_paused_environment_does_not_mutate() {
        let mut env = Environment::new(quiet_config()).unwrap();
        env.spawn_organism_at(Coordinate::new(5, 5)).unwrap();
        env.pause();
        assert_eq!(env.state(), RunState::Paused);
        env.run_step();
        assert_eq!(env.total_steps(), 0);
        assert_eq!(env.census().len(), 0);
        env.resume();
        env.run_step();
        assert_eq!(env.total_steps(), 1);
    }

    #[test]
    fn test_eating_restores_hunger_and_removes_food() {
        let mut config = quiet_config();
        config.seed = 5;
        let mut env = Environment::new(config).unwrap();
        let id = env.spawn_organism_at(Coordinate::new(5, 5)).unwrap();

        // Surround the organism so every move lands on food.
        for cell in grid::neighbors_in_radius(Coordinate::new(5, 5), 2, 10) {
            env.spawn_food_at(cell);
        }
        let before = env.food_count();
        // Drain hunger so the meal is visible through the ceiling clamp.
        env.organisms.get_mut(&id).unwrap().hunger = 0;
        let speed = env.organism(id).unwrap().speed;
        env.run_step();

        let eaten = before - env.food_count();
        // The first sub-step always lands on food; a second sub-step may
        // double back onto the emptied center cell.
        assert!(eaten >= 1 && eaten as u32 <= speed);
        let organism = env.organism(id).unwrap();
        assert_eq!(organism.hunger, -1 + 5 * eaten as i32);
        // Hunger was non-positive during upkeep, so health took the hit.
        assert_eq!(organism.health, 98);
    }
}
