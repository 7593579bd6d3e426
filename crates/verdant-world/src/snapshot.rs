//! Read-only views of the world for renderers and exporters.

use crate::food::Food;
use crate::organism::Organism;
use serde::{Deserialize, Serialize};
use verdant_core::{Coordinate, FoodId, OrganismId};

/// Summary counters for the HUD sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSummary {
    pub day: u64,
    pub steps_today: u64,
    pub total_steps: u64,
    pub population: usize,
    pub food: usize,
}

/// Renderer-facing view of one organism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganismSnapshot {
    pub id: OrganismId,
    pub position: Coordinate,
    pub health: i32,
    pub hunger: i32,
    pub generation: u32,
    pub pregnant: bool,
    /// Display tier: adult sprite above the juvenile age, baby sprite below.
    pub adult: bool,
}

impl From<&Organism> for OrganismSnapshot {
    fn from(organism: &Organism) -> Self {
        Self {
            id: organism.id,
            position: organism.position,
            health: organism.health,
            hunger: organism.hunger,
            generation: organism.generation,
            pregnant: organism.is_pregnant,
            adult: organism.is_adult_display(),
        }
    }
}

/// Renderer-facing view of one food item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSnapshot {
    pub id: FoodId,
    pub position: Coordinate,
    pub generation: u32,
    /// Mature food renders as food, immature as a sprout.
    pub mature: bool,
    /// Close to rotting; renderers dim the sprite.
    pub withering: bool,
}

impl From<&Food> for FoodSnapshot {
    fn from(food: &Food) -> Self {
        Self {
            id: food.id,
            position: food.position,
            generation: food.generation,
            mature: food.is_mature(),
            withering: food.is_withering(),
        }
    }
}

/// Complete ordered snapshot of the world at a step boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub summary: EnvironmentSummary,
    pub organisms: Vec<OrganismSnapshot>,
    pub food: Vec<FoodSnapshot>,
}
