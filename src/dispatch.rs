//! Command dispatch
//!
//! Translates a logical operator command into a single outbound frame on the
//! currently selected turtle's connection. Delivery goes through the session's
//! outbound queue, so dispatch never blocks on a stalled peer.

use crate::error::AppError;
use crate::protocol::Outbound;
use crate::session::SessionRegistry;
use tracing::debug;

/// A logical command an operator can send to the selected turtle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurtleCommand {
    /// Move one step in the given direction
    Move(String),
    /// Rotate toward the given direction
    Turn(String),
    /// Halt the current action
    Stop,
}

impl TurtleCommand {
    fn into_frame(self) -> Outbound {
        match self {
            TurtleCommand::Move(direction) => Outbound::Move { direction },
            TurtleCommand::Turn(direction) => Outbound::Turn { direction },
            TurtleCommand::Stop => Outbound::Stop,
        }
    }
}

/// Sends operator commands to the selected turtle's session
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    registry: SessionRegistry,
}

impl CommandDispatcher {
    /// Create a dispatcher over the given registry
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    /// Queue one command frame on the selected turtle's connection
    ///
    /// Returns `AppError::NoTurtleConnected` if no turtle is selected, the
    /// selected label has no live session, or its connection has closed.
    /// Failure leaves all state unchanged.
    pub async fn dispatch(&self, command: TurtleCommand) -> Result<(), AppError> {
        let handle = self
            .registry
            .selected_session()
            .await
            .ok_or(AppError::NoTurtleConnected)?;
        if !handle.is_open() {
            return Err(AppError::NoTurtleConnected);
        }

        debug!(conn_id = %handle.conn_id, command = ?command, "Dispatching command");
        handle.send(command.into_frame())
    }
}
