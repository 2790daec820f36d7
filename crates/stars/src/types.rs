//! Shared application state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::config::EngineConfig;
use crate::db::SnapshotDb;
use crate::engine::Engine;
use crate::notify::OutboxNotifier;

/// State shared across all API handlers.
///
/// The engine sits behind a single `RwLock`: every mutating operation runs as
/// one critical section, which is all the concurrency discipline the
/// invariants need.
pub struct AppState {
    pub engine: RwLock<Engine>,
    pub outbox: Arc<OutboxNotifier>,
    pub snapshot_db: Option<SnapshotDb>,
    pub config: EngineConfig,
}

impl AppState {
    /// Persists the engine state after a successful mutation. Best effort:
    /// a failed snapshot is logged, never surfaced to the caller.
    pub fn snapshot(&self, engine: &Engine) {
        if let Some(db) = &self.snapshot_db {
            if let Err(e) = db.save(engine) {
                warn!("Failed to write enrollment snapshot: {}", e);
            }
        }
    }
}
