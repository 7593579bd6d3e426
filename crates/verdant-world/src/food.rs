//! Food state: aging, decay countdown, pollination bookkeeping.

use rand::Rng;
use serde::{Deserialize, Serialize};
use verdant_core::{Coordinate, FoodId};

/// Base decay value; a fresh item draws its countdown from `[BASE, 3 * BASE]`.
pub const DECAY_BASE: i32 = 40;
/// Age above which an item counts as mature food rather than a sprout.
pub const MATURITY_AGE: u64 = 10;
/// Nutrition of a mature item.
pub const MATURE_VALUE: i32 = 20;
/// Nutrition of a sprout.
pub const SPROUT_VALUE: i32 = 5;
/// Decay threshold below which an unpollinated item scatters seeds.
pub const POLLINATION_THRESHOLD: i32 = 6;
/// Decay threshold below which the display tier switches to withering.
pub const WITHERING_THRESHOLD: i32 = 10;
/// Radius of the seed scatter around a pollinating item.
pub const SEED_RADIUS: i32 = 2;
/// Seed count per pollination is drawn uniformly from `[0, MAX_SEEDS]`.
pub const MAX_SEEDS: u32 = 3;

/// A food item on the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Coordinate,
    /// Steps left before the item rots away; counts down when decay is on.
    pub decay: i32,
    pub age: u64,
    /// Set exactly once, when the item first scatters seeds.
    pub pollinated: bool,
    pub generation: u32,
}

impl Food {
    pub fn new<R: Rng>(
        id: FoodId,
        position: Coordinate,
        rng: &mut R,
        generation: u32,
        age: u64,
    ) -> Self {
        Self {
            id,
            position,
            decay: rng.gen_range(DECAY_BASE..=DECAY_BASE * 3),
            age,
            pollinated: false,
            generation,
        }
    }

    /// Hunger restored when eaten. Sprouts are worth little; mature food a lot.
    pub fn nutrition_value(&self) -> i32 {
        if self.age > MATURITY_AGE {
            MATURE_VALUE
        } else {
            SPROUT_VALUE
        }
    }

    pub fn is_mature(&self) -> bool {
        self.age > MATURITY_AGE
    }

    pub fn is_withering(&self) -> bool {
        self.decay < WITHERING_THRESHOLD
    }

    /// True while the one-shot pollination is still pending.
    pub fn wants_pollination(&self) -> bool {
        self.decay < POLLINATION_THRESHOLD && !self.pollinated
    }

    /// Age one step; returns true when the decay countdown is spent and the
    /// item must be removed this step.
    pub fn advance_one_step(&mut self, decay_enabled: bool) -> bool {
        self.age += 1;
        if decay_enabled {
            self.decay -= 1;
        }
        decay_enabled && self.decay == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_food(age: u64) -> Food {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        Food::new(FoodId(0), Coordinate::new(3, 3), &mut rng, 1, age)
    }

    #[test]
    fn test_decay_drawn_within_range() {
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let food = Food::new(FoodId(0), Coordinate::new(0, 0), &mut rng, 1, 0);
            assert!(food.decay >= DECAY_BASE);
            assert!(food.decay <= DECAY_BASE * 3);
        }
    }

    #[test]
    fn test_nutrition_tiers() {
        assert_eq!(test_food(0).nutrition_value(), SPROUT_VALUE);
        assert_eq!(test_food(10).nutrition_value(), SPROUT_VALUE);
        assert_eq!(test_food(11).nutrition_value(), MATURE_VALUE);
        assert!(test_food(11).is_mature());
        assert!(!test_food(10).is_mature());
    }

    #[test]
    fn test_advance_counts_down_to_removal() {
        let mut food = test_food(0);
        food.decay = 2;
        assert!(!food.advance_one_step(true));
        assert!(food.advance_one_step(true));
        assert_eq!(food.decay, 0);
    }

    #[test]
    fn test_advance_without_decay_only_ages() {
        let mut food = test_food(0);
        let decay = food.decay;
        for _ in 0..200 {
            assert!(!food.advance_one_step(false));
        }
        assert_eq!(food.decay, decay);
        assert_eq!(food.age, 200);
    }

    #[test]
    fn test_pollination_window() {
        let mut food = test_food(0);
        food.decay = 6;
        assert!(!food.wants_pollination());
        food.decay = 5;
        assert!(food.wants_pollination());
        food.pollinated = true;
        assert!(!food.wants_pollination());
    }
}
