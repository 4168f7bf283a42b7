//! Per-connection session logic
//!
//! One `TurtleSession` per connected turtle. It interprets inbound frames,
//! routes all side effects through `WorldStore` and `SessionRegistry`, and
//! holds no durable state of its own beyond the resolved label. The socket
//! plumbing lives in `ws.rs`; this type only sees decoded text, which keeps
//! the whole state machine testable without a live connection.

use super::registry::{SessionHandle, SessionRegistry};
use crate::error::AppError;
use crate::protocol::{Heading, Inbound, Label, Outbound, Position};
use crate::world::WorldStore;
use tracing::{debug, info, warn};

/// State of one turtle connection, from accept to close
pub struct TurtleSession {
    world: WorldStore,
    registry: SessionRegistry,
    handle: SessionHandle,
    /// Resolved once the turtle completes registration
    label: Option<Label>,
}

impl TurtleSession {
    /// Start an anonymous session over a fresh connection handle
    pub fn new(world: WorldStore, registry: SessionRegistry, handle: SessionHandle) -> Self {
        Self {
            world,
            registry,
            handle,
            label: None,
        }
    }

    /// The session's label, once registration has completed
    pub fn label(&self) -> Option<Label> {
        self.label
    }

    /// Handle one raw text frame from the connection
    ///
    /// A frame that fails to parse or to apply is logged and dropped; nothing
    /// here ever terminates the session loop.
    pub async fn handle_text(&mut self, text: &str) {
        let frame = match serde_json::from_str::<Inbound>(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Dropping malformed frame");
                return;
            }
        };

        if let Err(e) = self.handle_frame(frame).await {
            warn!(error = %e, label = ?self.label, "Dropping frame after handling error");
        }
    }

    /// Apply one decoded frame
    pub async fn handle_frame(&mut self, frame: Inbound) -> Result<(), AppError> {
        match frame {
            Inbound::Status {
                turtle_position,
                turtle_direction,
                block_forward,
                block_above,
                block_below,
                turtle_label,
            } => {
                self.on_status(
                    turtle_position,
                    turtle_direction,
                    block_forward,
                    block_above,
                    block_below,
                    turtle_label,
                )
                .await
            }
            Inbound::TurtleInformation { turtle_label } => {
                self.on_turtle_information(turtle_label).await
            }
        }
    }

    /// Telemetry: record the three adjacent observations and, when the frame
    /// carries a label, update that turtle's stored position/heading
    async fn on_status(
        &mut self,
        position: Position,
        heading: Heading,
        forward: String,
        above: String,
        below: String,
        label: Option<Label>,
    ) -> Result<(), AppError> {
        if let Some(label) = label {
            self.world.upsert_turtle(label, position, heading).await?;
        }
        self.world
            .record_observations(position, heading, forward, above, below)
            .await?;
        debug!(label = ?label, position = %position.key(), "Telemetry recorded");
        Ok(())
    }

    /// Registration: resolve the label (allocating one if absent), bind this
    /// connection in the registry, make it the selection, and push the stored
    /// location back to the turtle
    async fn on_turtle_information(&mut self, label: Option<Label>) -> Result<(), AppError> {
        let label = match label {
            Some(label) => label,
            None => {
                let label = self.world.allocate_label().await?;
                info!(label = %label, conn_id = %self.handle.conn_id, "Allocated label for new turtle");
                self.handle.send(Outbound::InitLabel {
                    turtle_label: label,
                })?;
                label
            }
        };

        let Some(turtle) = self.world.get_turtle(label).await else {
            // The turtle claims a label the store has never seen; ignore the
            // frame rather than inventing a record for it
            warn!(label = %label, "Registration with unknown label ignored");
            return Ok(());
        };

        if let Some(superseded) = self.registry.register(label, self.handle.clone()).await {
            debug!(
                label = %label,
                old_conn_id = %superseded.conn_id,
                "Reconnect superseded an existing session"
            );
        }
        self.registry.set_selected(label).await;
        self.label = Some(label);

        info!(label = %label, conn_id = %self.handle.conn_id, "Turtle registered");
        self.handle.send(Outbound::LocationUpdate {
            turtle_position: turtle.position,
            turtle_direction: turtle.heading,
        })
    }

    /// Tear the session down after the connection closes
    ///
    /// Identity-checked, so a superseded session closing late cannot evict the
    /// newer one.
    pub async fn close(&self) {
        if let Some(label) = self.label {
            self.registry.unregister(label, self.handle.conn_id).await;
            info!(label = %label, conn_id = %self.handle.conn_id, "Session closed");
        } else {
            debug!(conn_id = %self.handle.conn_id, "Anonymous session closed");
        }
    }
}
