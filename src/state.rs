// Application state
// Wires the shared components together for the router and the session tasks

use crate::config::Config;
use crate::dispatch::CommandDispatcher;
use crate::session::SessionRegistry;
use crate::world::WorldStore;

/// Shared handles injected into every connection task and HTTP handler
///
/// The store and registry do their own locking internally, so this clones
/// cheaply and is used directly as the axum state type.
#[derive(Clone)]
pub struct AppState {
    /// Durable world model (turtle registry + block map)
    pub world: WorldStore,
    /// Live connection handles and the selection pointer
    pub registry: SessionRegistry,
    /// Command path from the operator surface to the selected session
    pub dispatcher: CommandDispatcher,
}

impl AppState {
    /// Build the shared state, loading persisted world tables from disk
    pub fn new(config: &Config) -> Self {
        let world = WorldStore::open(&config.persistence.data_dir, config.labels);
        let registry = SessionRegistry::new();
        let dispatcher = CommandDispatcher::new(registry.clone());
        Self {
            world,
            registry,
            dispatcher,
        }
    }
}
