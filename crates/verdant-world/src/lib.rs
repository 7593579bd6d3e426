//! Foraging-simulation engine.
//!
//! This crate implements the 2D toroidal grid world where organisms roam,
//! eat, reproduce, and die, and the day/step scheduler that drives them.

pub mod control;
pub mod environment;
pub mod food;
pub mod grid;
pub mod index;
pub mod organism;
pub mod snapshot;

pub use control::ControlHandle;
pub use environment::{Environment, RunState};
pub use food::Food;
pub use index::{EntityRef, SpatialIndex};
pub use organism::Organism;
pub use snapshot::{EnvironmentSummary, FoodSnapshot, OrganismSnapshot, WorldSnapshot};
