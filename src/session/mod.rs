// Session management module
// Handles live connection handles, selection, and per-frame session logic

pub mod handler;
pub mod registry;

pub use handler::TurtleSession;
pub use registry::{ConnId, SessionHandle, SessionRegistry};
