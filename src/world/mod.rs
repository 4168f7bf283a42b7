// World state module
// Handles the turtle registry, the observed-block map, and persistence

pub mod persistence;
pub mod store;

pub use persistence::PersistenceError;
pub use store::{Turtle, WorldStore};
