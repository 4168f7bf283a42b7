//! API module
//!
//! Contains HTTP request handlers for the operator control surface

pub mod control;

pub use control::*;
