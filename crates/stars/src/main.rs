use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;
use tracing::{info, warn};

use stars::config::{load_seed_dir, EngineConfig};
use stars::db::SnapshotDb;
use stars::engine::Engine;
use stars::notify::OutboxNotifier;
use stars::server::create_router;
use stars::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = if Path::new(&config_path).exists() {
        EngineConfig::load(Path::new(&config_path))?
    } else {
        warn!("Config file {} not found, using defaults", config_path);
        EngineConfig::default()
    };

    let outbox = Arc::new(OutboxNotifier::new());
    let mut engine = Engine::new(config.max_load, outbox.clone());

    if let Some(seed_dir) = &config.seed_dir {
        load_seed_dir(seed_dir, &mut engine).context("loading seed data")?;
    }

    let snapshot_db = match &config.snapshot_db_path {
        Some(path) => {
            let db = SnapshotDb::new(path).context("opening snapshot database")?;
            db.load_into(&mut engine).context("replaying snapshot")?;
            info!("Replayed enrollment snapshot from {}", path);
            Some(db)
        }
        None => None,
    };

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState {
        engine: RwLock::new(engine),
        outbox,
        snapshot_db,
        config,
    });

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
