//! Docker client — core struct, connection setup, error types.
//!
//! Domain methods live in sibling modules (`container`, `image`, `system`,
//! `exec`, `compose`) which add `impl DockerClient` blocks.

use std::path::PathBuf;
use std::sync::Arc;

use bollard::Docker;
use thiserror::Error;

use crate::conf::ConnectionSpec;
use super::tunnel::SshTunnel;

#[derive(Error, Debug)]
pub enum DockerError {
    #[error("Docker connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Container not found: {0}")]
    ContainerNotFound(String),
    #[error("Image not found: {0}")]
    ImageNotFound(String),
    #[error("Exec failed: {0}")]
    ExecFailed(String),
    #[error("Bollard error: {0}")]
    BollardError(#[from] bollard::errors::Error),
}

#[derive(Clone)]
pub struct DockerClient {
    /// The bollard Docker client.  `pub(super)` so that domain modules
    /// in sibling files can call bollard APIs directly.
    pub(super) client: Docker,
    /// Keeps the SSH local-forward subprocess alive for the lifetime of the
    /// client when the `DirectSsh` transport is in use.
    _tunnel: Option<Arc<SshTunnel>>,
}

/// Candidate local socket paths, probed in order.
fn socket_candidates(home: &std::path::Path) -> Vec<PathBuf> {
    vec![
        home.join(".orbstack/run/docker.sock"),
        home.join(".docker/run/docker.sock"),
        PathBuf::from("/var/run/docker.sock"),
        // Docker Desktop on Windows, reached from inside WSL
        PathBuf::from("/mnt/wsl/docker-desktop/shared-sockets/guest-services/docker.sock"),
    ]
}

/// First existing conventional socket path, or the default path so the
/// daemon client reports the failure at use time.
pub fn detect_socket_path() -> PathBuf {
    let home = crate::conf::model::home_dir();
    socket_candidates(&home)
        .into_iter()
        .find(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from("/var/run/docker.sock"))
}

impl DockerClient {
    /// Open a client for the given connection spec. Reachability is not
    /// validated here; callers probe with [`DockerClient::version`].
    pub async fn connect(spec: &ConnectionSpec) -> Result<Self, DockerError> {
        match spec {
            ConnectionSpec::Local => {
                let socket = detect_socket_path();
                tracing::info!("Using local Docker socket: {}", socket.display());
                let client = Docker::connect_with_socket(
                    &socket.to_string_lossy(),
                    120,
                    &bollard::API_DEFAULT_VERSION,
                )
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?;
                Ok(Self {
                    client,
                    _tunnel: None,
                })
            }
            ConnectionSpec::TcpTunnel {
                host,
                port,
                timeout_ms,
            } => {
                let addr = format!("tcp://{}:{}", host, port);
                tracing::info!("Using Docker daemon over TCP at {}", addr);
                let client = Docker::connect_with_http(
                    &addr,
                    timeout_secs(*timeout_ms),
                    &bollard::API_DEFAULT_VERSION,
                )
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?;
                Ok(Self {
                    client,
                    _tunnel: None,
                })
            }
            ConnectionSpec::DirectSsh { timeout_ms, .. } => {
                let tunnel = SshTunnel::open(spec).await?;
                let addr = format!("tcp://127.0.0.1:{}", tunnel.local_port());
                tracing::info!("Using Docker daemon through SSH forward at {}", addr);
                let client = Docker::connect_with_http(
                    &addr,
                    timeout_secs(*timeout_ms),
                    &bollard::API_DEFAULT_VERSION,
                )
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?;
                Ok(Self {
                    client,
                    _tunnel: Some(Arc::new(tunnel)),
                })
            }
        }
    }
}

fn timeout_secs(timeout_ms: u64) -> u64 {
    (timeout_ms / 1000).max(1)
}

#[cfg(test)]
impl DockerClient {
    /// Client backed by a socket path nothing listens on. Construction does
    /// not touch the socket, so this is usable in tests that never issue a
    /// daemon request.
    pub fn disconnected() -> Self {
        // bollard's socket constructor only checks that the path exists; it
        // never dials, so an empty file keeps construction infallible.
        let _ = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/docker-mcp-test-no-daemon.sock");
        let client = Docker::connect_with_socket(
            "/tmp/docker-mcp-test-no-daemon.sock",
            120,
            &bollard::API_DEFAULT_VERSION,
        )
        .expect("socket client construction is infallible for a valid path");
        Self {
            client,
            _tunnel: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_candidates_prefer_per_user_sockets() {
        let home = std::path::Path::new("/home/tester");
        let candidates = socket_candidates(home);
        assert_eq!(
            candidates[0],
            PathBuf::from("/home/tester/.orbstack/run/docker.sock")
        );
        assert!(candidates.contains(&PathBuf::from("/var/run/docker.sock")));
    }

    #[test]
    fn timeout_is_floored_to_one_second() {
        assert_eq!(timeout_secs(10_000), 10);
        assert_eq!(timeout_secs(250), 1);
        assert_eq!(timeout_secs(0), 1);
    }
}
