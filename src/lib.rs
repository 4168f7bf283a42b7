//! Turtle Relay Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod session;
pub mod state;
/// World state management
///
/// Handles the turtle registry, block-observation map, and persistence.
pub mod world;
pub mod ws;
