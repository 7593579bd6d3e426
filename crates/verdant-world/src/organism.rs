//! Organism state: energy bookkeeping, maturation, pregnancy.

use rand::Rng;
use serde::{Deserialize, Serialize};
use verdant_core::{Coordinate, Direction, OrganismId};

pub const MAX_HEALTH: i32 = 100;
pub const MAX_HUNGER: i32 = 100;
pub const HUNGER_FLOOR: i32 = -20;
/// Health lost per step while hunger is at or below zero.
pub const STARVING_HEALTH_LOSS: i32 = 2;
/// Health regained per step while hunger is positive.
pub const FED_HEALTH_GAIN: i32 = 1;
/// Health spent on a successful birth.
pub const BIRTH_HEALTH_COST: i32 = 30;
/// Health spent on the miscarriage path.
pub const MISCARRIAGE_HEALTH_COST: i32 = 10;
/// A birth only produces offspring above this health; at or below it the
/// pregnancy ends in a food deposit instead.
pub const HEALTHY_BIRTH_THRESHOLD: i32 = 50;
/// Conception succeeds when a uniform draw from `[0, 10]` is below this.
pub const CONCEPTION_CHANCE: i32 = 2;
/// Age above which the display tier switches from juvenile to adult.
pub const ADULT_DISPLAY_AGE: u64 = 10;

/// An organism on the grid.
///
/// Health and hunger are clamped back into range after every adjustment, so
/// observers never see an out-of-range value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub position: Coordinate,
    pub health: i32,
    pub hunger: i32,
    /// Cells moved per step, 1 or 2, fixed at spawn.
    pub speed: u32,
    /// Steps alive.
    pub age: u64,
    pub generation: u32,
    pub is_pregnant: bool,
    pub steps_pregnant: u64,
    /// Global step count at the most recent birth (0 if never).
    pub last_birth_step: u64,
    /// Random-walk heading, re-rolled before every movement sub-step.
    pub facing: Direction,
}

impl Organism {
    pub fn new<R: Rng>(
        id: OrganismId,
        position: Coordinate,
        rng: &mut R,
        generation: u32,
    ) -> Self {
        Self {
            id,
            position,
            health: MAX_HEALTH,
            hunger: MAX_HUNGER,
            speed: rng.gen_range(1..=2),
            age: 0,
            generation,
            is_pregnant: false,
            steps_pregnant: 0,
            last_birth_step: 0,
            facing: Direction::random(rng),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn adjust_health(&mut self, delta: i32) {
        self.health = (self.health + delta).clamp(0, MAX_HEALTH);
    }

    pub fn adjust_hunger(&mut self, delta: i32) {
        self.hunger = (self.hunger + delta).clamp(HUNGER_FLOOR, MAX_HUNGER);
    }

    /// Per-step upkeep: age, hunger drain, and the hunger-driven health
    /// change. Returns false when the organism has just died of it.
    pub fn metabolize(&mut self) -> bool {
        self.age += 1;
        self.adjust_hunger(-1);
        if self.hunger <= 0 {
            self.adjust_health(-STARVING_HEALTH_LOSS);
        } else {
            self.adjust_health(FED_HEALTH_GAIN);
        }
        self.is_alive()
    }

    pub fn conceive(&mut self) {
        self.is_pregnant = true;
        self.steps_pregnant = 0;
    }

    /// Clear pregnancy state; called on every birth outcome.
    pub fn deliver(&mut self, total_steps: u64) {
        self.is_pregnant = false;
        self.steps_pregnant = 0;
        self.last_birth_step = total_steps;
    }

    pub fn is_adult_display(&self) -> bool {
        self.age > ADULT_DISPLAY_AGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_organism() -> Organism {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        Organism::new(OrganismId(0), Coordinate::new(5, 5), &mut rng, 0)
    }

    #[test]
    fn test_spawn_defaults() {
        let organism = test_organism();
        assert_eq!(organism.health, MAX_HEALTH);
        assert_eq!(organism.hunger, MAX_HUNGER);
        assert!(organism.speed == 1 || organism.speed == 2);
        assert!(!organism.is_pregnant);
        assert!(organism.is_alive());
    }

    #[test]
    fn test_clamps_hold_at_both_ends() {
        let mut organism = test_organism();
        organism.adjust_hunger(50);
        assert_eq!(organism.hunger, MAX_HUNGER);
        organism.adjust_hunger(-500);
        assert_eq!(organism.hunger, HUNGER_FLOOR);

        organism.adjust_health(50);
        assert_eq!(organism.health, MAX_HEALTH);
        organism.adjust_health(-500);
        assert_eq!(organism.health, 0);
    }

    #[test]
    fn test_metabolize_fed_and_starving() {
        let mut organism = test_organism();
        organism.health = 90;
        assert!(organism.metabolize());
        // hunger 100 -> 99, still positive, so health climbs by one
        assert_eq!(organism.hunger, 99);
        assert_eq!(organism.health, 91);

        organism.hunger = 1;
        assert!(organism.metabolize());
        // hunger hit zero this step, so health drops instead
        assert_eq!(organism.hunger, 0);
        assert_eq!(organism.health, 89);
    }

    #[test]
    fn test_metabolize_kills_at_zero_health() {
        let mut organism = test_organism();
        organism.hunger = -20;
        organism.health = 2;
        assert!(!organism.metabolize());
        assert_eq!(organism.health, 0);

        // An odd starting health cannot skip past zero.
        let mut organism = test_organism();
        organism.hunger = -20;
        organism.health = 1;
        assert!(!organism.metabolize());
        assert_eq!(organism.health, 0);
    }

    #[test]
    fn test_deliver_clears_pregnancy() {
        let mut organism = test_organism();
        organism.conceive();
        assert!(organism.is_pregnant);
        organism.steps_pregnant = 40;
        organism.deliver(123);
        assert!(!organism.is_pregnant);
        assert_eq!(organism.steps_pregnant, 0);
        assert_eq!(organism.last_birth_step, 123);
    }
}
