//! Shared types for the Verdant foraging simulation.

pub mod census;
pub mod config;
pub mod error;
pub mod types;

pub use census::CensusLog;
pub use config::WorldConfig;
pub use error::{Error, Result};
pub use types::{Coordinate, Direction, FoodId, OrganismId};
