//! Server state — configuration plus the connected daemon client.

use std::sync::Arc;

use crate::conf::ServerConfig;
use crate::docker::client::DockerClient;

pub struct ServerState {
    pub config: ServerConfig,
    pub docker: DockerClient,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(config: ServerConfig, docker: DockerClient) -> Self {
        Self { config, docker }
    }
}
