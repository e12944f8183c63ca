//! Configuration model — server identity and the resolved connection spec.

use std::path::PathBuf;

/// Default daemon port behind a TCP tunnel.
pub const DEFAULT_TCP_PORT: u16 = 2375;
/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;
/// Default SSH username.
pub const DEFAULT_SSH_USER: &str = "root";
/// Default Docker socket path on the remote host.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/docker.sock";
/// Default daemon connection timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// How to reach the Docker daemon. Exactly one transport is active; the
/// variants carry only the fields that transport needs, so an inconsistent
/// mix (say, an SSH username with a TCP endpoint) cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSpec {
    /// Daemon on a local socket, detected at connect time.
    Local,
    /// Daemon exposed over plain TCP, typically through a manual SSH tunnel.
    TcpTunnel {
        host: String,
        port: u16,
        timeout_ms: u64,
    },
    /// Daemon reached over SSH to a remote host's socket.
    DirectSsh {
        host: String,
        port: u16,
        username: String,
        socket_path: String,
        /// Decoded key material, never a file path. Absent when no key was
        /// configured or the configured file could not be read — resolution
        /// itself never fails over key material.
        private_key: Option<String>,
        passphrase: Option<String>,
        timeout_ms: u64,
    },
}

/// Top-level server configuration: identity plus the resolved connection.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub connection: ConnectionSpec,
}

impl ServerConfig {
    /// Load from environment variables with sensible defaults, resolving the
    /// daemon connection from the `DOCKER_MCP_*` family.
    pub fn load() -> Self {
        let overrides = super::resolve::ConnectionOverrides::from_env();
        let home = home_dir();
        let ssh_config = super::ssh::load_ssh_config(&home);
        let connection = super::resolve::resolve(&overrides, ssh_config.as_deref(), &home);

        Self {
            name: std::env::var("DOCKER_MCP_SERVER_NAME")
                .unwrap_or_else(|_| "docker-mcp-server".to_string()),
            version: std::env::var("DOCKER_MCP_SERVER_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            connection,
        }
    }
}

/// The current user's home directory, falling back to `/root`.
pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/root"))
}

impl ConnectionSpec {
    /// Human-readable transport summary for startup logging.
    pub fn describe(&self) -> String {
        match self {
            ConnectionSpec::Local => "local Docker daemon".to_string(),
            ConnectionSpec::TcpTunnel { host, port, .. } => {
                format!("TCP tunnel to {}:{}", host, port)
            }
            ConnectionSpec::DirectSsh {
                host,
                port,
                username,
                private_key,
                ..
            } => format!(
                "SSH to {}@{}:{} (key: {})",
                username,
                host,
                port,
                if private_key.is_some() { "loaded" } else { "none" }
            ),
        }
    }
}
