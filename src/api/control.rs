//! Operator control surface handlers
//!
//! Thin request/response wrappers over the core interfaces: selection,
//! command dispatch, and world-state reads. No table is mutated here.

use crate::dispatch::TurtleCommand;
use crate::error::AppError;
use crate::protocol::Label;
use crate::state::AppState;
use crate::world::Turtle;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message response
#[derive(Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

/// Select turtle request
#[derive(Deserialize)]
pub struct SelectTurtleRequest {
    /// Label of the turtle to select
    pub label: Label,
}

/// World snapshot returned by the status endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    /// Stored record of the selected turtle, if any
    pub current_turtle: Option<Turtle>,
    /// Label of the selected turtle, if any
    pub current_label: Option<Label>,
    /// Full turtle registry
    pub turtles: HashMap<Label, Turtle>,
    /// Full block-observation map
    pub block_stats: HashMap<String, String>,
}

/// POST /set_turtle - Point the selection at a connected turtle
pub async fn set_turtle(
    State(state): State<AppState>,
    Json(request): Json<SelectTurtleRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.registry.set_selected(request.label).await {
        return Err(AppError::NoTurtleConnected);
    }
    Ok(Json(MessageResponse {
        message: format!("Turtle {} set as current turtle.", request.label),
    }))
}

/// POST /move/:direction - Move the selected turtle one step
pub async fn move_turtle(
    State(state): State<AppState>,
    Path(direction): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .dispatcher
        .dispatch(TurtleCommand::Move(direction.clone()))
        .await?;
    Ok(Json(MessageResponse {
        message: format!("Moved {}", direction),
    }))
}

/// POST /turn/:direction - Turn the selected turtle
pub async fn turn_turtle(
    State(state): State<AppState>,
    Path(direction): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .dispatcher
        .dispatch(TurtleCommand::Turn(direction.clone()))
        .await?;
    Ok(Json(MessageResponse {
        message: format!("Turned {}", direction),
    }))
}

/// POST /stop - Halt the selected turtle
pub async fn stop_turtle(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    state.dispatcher.dispatch(TurtleCommand::Stop).await?;
    Ok(Json(MessageResponse {
        message: "Turtle stopped.".to_string(),
    }))
}

/// GET /status - Snapshot of the selection and both world tables
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let current_label = state.registry.get_selected().await;
    let current_turtle = match current_label {
        Some(label) => state.world.get_turtle(label).await,
        None => None,
    };

    Json(StatusResponse {
        current_turtle,
        current_label,
        turtles: state.world.all_turtles().await,
        block_stats: state.world.all_observations().await,
    })
}
