//! Boot — logging init, config load, Docker connection, state creation.

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::ServerConfig;
use crate::docker::client::DockerClient;
use crate::state::{ServerState, SharedState};

/// Initialise the tracing / logging subsystem.
///
/// Everything goes to stderr: stdout is the JSON-RPC transport and must
/// carry nothing but protocol messages.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config, connect to Docker, probe the daemon, and build shared state.
pub async fn boot() -> Result<SharedState, Box<dyn std::error::Error>> {
    let config = ServerConfig::load();
    info!(
        "Starting {} v{}",
        config.name, config.version
    );
    info!("Docker connection: {}", config.connection.describe());

    let docker = DockerClient::connect(&config.connection).await.map_err(|e| {
        error!("Failed to set up Docker connection: {}", e);
        e
    })?;

    // An unreachable daemon is fatal at startup rather than on first tool call.
    match docker.version().await {
        Ok(version) => {
            info!(
                "Connected to Docker daemon (version: {})",
                version.version.as_deref().unwrap_or("unknown")
            );
        }
        Err(e) => {
            error!("Docker daemon is not reachable: {}", e);
            return Err(Box::new(e));
        }
    }

    let state = Arc::new(ServerState::new(config, docker));
    info!("Initialized shared server state");

    Ok(state)
}
