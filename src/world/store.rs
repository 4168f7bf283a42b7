//! Shared world state
//!
//! The `WorldStore` is the system of record for everything the fleet has
//! reported: the turtle registry (label -> position/heading) and the sparse
//! map of observed blocks. Both tables live behind their own lock and are
//! written through to disk before any mutating call returns, so concurrent
//! telemetry from different turtles can never produce lost updates.

use super::persistence::WorldFiles;
use crate::config::LabelConfig;
use crate::error::AppError;
use crate::protocol::{Heading, Label, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// A turtle's last known position and heading
///
/// Persisted as a flat `{x, y, z, direction}` record keyed by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turtle {
    /// Last reported position
    #[serde(flatten)]
    pub position: Position,
    /// Last reported heading
    #[serde(rename = "direction")]
    pub heading: Heading,
}

impl Turtle {
    /// A fresh turtle at the origin facing east (heading 1)
    pub fn zeroed() -> Self {
        Self {
            position: Position::ORIGIN,
            heading: Heading::East,
        }
    }
}

/// Concurrency-safe store for the turtle registry and block map
///
/// Cloning is cheap; all clones share the same tables.
#[derive(Debug, Clone)]
pub struct WorldStore {
    turtles: Arc<RwLock<HashMap<Label, Turtle>>>,
    blocks: Arc<RwLock<HashMap<String, String>>>,
    files: Arc<WorldFiles>,
    labels: LabelConfig,
}

impl WorldStore {
    /// Open the store over the tables persisted under `data_dir`
    ///
    /// An unreadable or missing table falls back to empty with a warning;
    /// startup never fails on bad persisted state.
    pub fn open<P: AsRef<Path>>(data_dir: P, labels: LabelConfig) -> Self {
        let files = WorldFiles::new(data_dir);

        let turtles = files.load_turtles().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load turtle registry, starting empty");
            HashMap::new()
        });
        let blocks = files.load_blocks().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load block map, starting empty");
            HashMap::new()
        });

        Self {
            turtles: Arc::new(RwLock::new(turtles)),
            blocks: Arc::new(RwLock::new(blocks)),
            files: Arc::new(files),
            labels,
        }
    }

    /// Get a turtle's stored position/heading by label
    pub async fn get_turtle(&self, label: Label) -> Option<Turtle> {
        self.turtles.read().await.get(&label).copied()
    }

    /// Create or overwrite a turtle's position/heading
    ///
    /// The registry file is rewritten before this returns; the write lock is
    /// held across the file write so concurrent upserts serialize.
    pub async fn upsert_turtle(
        &self,
        label: Label,
        position: Position,
        heading: Heading,
    ) -> Result<(), AppError> {
        let mut turtles = self.turtles.write().await;
        turtles.insert(label, Turtle { position, heading });
        self.files.save_turtles(&turtles)?;
        Ok(())
    }

    /// Allocate a fresh label and insert a zeroed turtle for it
    ///
    /// Labels are drawn at random from the configured range, retrying on
    /// collision. Allocation and insertion happen under one write lock, so
    /// two concurrent allocations can never return the same label.
    pub async fn allocate_label(&self) -> Result<Label, AppError> {
        let mut turtles = self.turtles.write().await;

        let range_size = (self.labels.max - self.labels.min + 1) as usize;
        if turtles.len() >= range_size {
            return Err(AppError::LabelsExhausted);
        }

        let mut rng = rand::thread_rng();
        let label = loop {
            let candidate = rng.gen_range(self.labels.min..=self.labels.max);
            if !turtles.contains_key(&candidate) {
                break candidate;
            }
        };

        turtles.insert(label, Turtle::zeroed());
        self.files.save_turtles(&turtles)?;
        Ok(label)
    }

    /// Record the three adjacent block observations from a telemetry frame
    ///
    /// Writes the block identifiers at the coordinates ahead, above, and below
    /// the reporting turtle, then removes any observation at the turtle's own
    /// coordinate (a turtle cannot stand inside a recorded block).
    pub async fn record_observations(
        &self,
        position: Position,
        heading: Heading,
        forward: String,
        above: String,
        below: String,
    ) -> Result<(), AppError> {
        let mut blocks = self.blocks.write().await;
        blocks.insert(heading.ahead_of(position).key(), forward);
        blocks.insert(position.above().key(), above);
        blocks.insert(position.below().key(), below);
        blocks.remove(&position.key());
        self.files.save_blocks(&blocks)?;
        Ok(())
    }

    /// Snapshot of the full block map
    pub async fn all_observations(&self) -> HashMap<String, String> {
        self.blocks.read().await.clone()
    }

    /// Snapshot of the full turtle registry
    pub async fn all_turtles(&self) -> HashMap<Label, Turtle> {
        self.turtles.read().await.clone()
    }
}
