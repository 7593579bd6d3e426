//! Coordinate-to-entity index, maintained incrementally on insert, move,
//! and remove rather than rebuilt per lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use verdant_core::{Coordinate, FoodId, OrganismId};

/// What occupies a grid cell, as seen by the inspection lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    Food(FoodId),
    Organism(OrganismId),
}

/// Spatial occupancy index for both entity kinds.
///
/// At most one entry per kind per cell. Insertion is first-writer-wins: when
/// organisms stack through movement, the earlier occupant stays reachable and
/// the later one is simply not indexed until it moves to a cell of its own.
/// Removal only clears an entry that maps to the removed id, so a lookup
/// never yields a handle to an entity that is gone.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    food: HashMap<Coordinate, FoodId>,
    organisms: HashMap<Coordinate, OrganismId>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn food_at(&self, position: Coordinate) -> Option<FoodId> {
        self.food.get(&position).copied()
    }

    pub fn organism_at(&self, position: Coordinate) -> Option<OrganismId> {
        self.organisms.get(&position).copied()
    }

    /// True when neither kind occupies the cell. Placement paths (spawns,
    /// births, seeds) require this; movement does not.
    pub fn is_free(&self, position: Coordinate) -> bool {
        !self.food.contains_key(&position) && !self.organisms.contains_key(&position)
    }

    /// Food takes priority over organisms; documented policy of the
    /// inspection lookup, not an accident.
    pub fn entity_at(&self, position: Coordinate) -> Option<EntityRef> {
        if let Some(id) = self.food_at(position) {
            return Some(EntityRef::Food(id));
        }
        self.organism_at(position).map(EntityRef::Organism)
    }

    pub fn insert_food(&mut self, position: Coordinate, id: FoodId) {
        self.food.entry(position).or_insert(id);
    }

    pub fn remove_food(&mut self, position: Coordinate, id: FoodId) {
        if self.food.get(&position) == Some(&id) {
            self.food.remove(&position);
        }
    }

    pub fn insert_organism(&mut self, position: Coordinate, id: OrganismId) {
        self.organisms.entry(position).or_insert(id);
    }

    pub fn remove_organism(&mut self, position: Coordinate, id: OrganismId) {
        if self.organisms.get(&position) == Some(&id) {
            self.organisms.remove(&position);
        }
    }

    pub fn move_organism(&mut self, from: Coordinate, to: Coordinate, id: OrganismId) {
        self.remove_organism(from, id);
        self.insert_organism(to, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefers_food() {
        let mut index = SpatialIndex::new();
        let cell = Coordinate::new(2, 2);
        index.insert_organism(cell, OrganismId(1));
        index.insert_food(cell, FoodId(7));
        assert_eq!(index.entity_at(cell), Some(EntityRef::Food(FoodId(7))));
    }

    #[test]
    fn test_first_writer_wins() {
        let mut index = SpatialIndex::new();
        let cell = Coordinate::new(4, 4);
        index.insert_organism(cell, OrganismId(1));
        index.insert_organism(cell, OrganismId(2));
        assert_eq!(index.organism_at(cell), Some(OrganismId(1)));

        // The unindexed occupant leaving must not evict the indexed one.
        index.remove_organism(cell, OrganismId(2));
        assert_eq!(index.organism_at(cell), Some(OrganismId(1)));
    }

    #[test]
    fn test_remove_clears_only_matching_id() {
        let mut index = SpatialIndex::new();
        let cell = Coordinate::new(0, 0);
        index.insert_food(cell, FoodId(3));
        index.remove_food(cell, FoodId(4));
        assert_eq!(index.food_at(cell), Some(FoodId(3)));
        index.remove_food(cell, FoodId(3));
        assert_eq!(index.food_at(cell), None);
    }

    #[test]
    fn test_move_updates_both_cells() {
        let mut index = SpatialIndex::new();
        let a = Coordinate::new(1, 1);
        let b = Coordinate::new(1, 2);
        index.insert_organism(a, OrganismId(9));
        index.move_organism(a, b, OrganismId(9));
        assert_eq!(index.organism_at(a), None);
        assert_eq!(index.organism_at(b), Some(OrganismId(9)));
        assert!(index.is_free(a));
        assert!(!index.is_free(b));
    }
}
