//! System domain — daemon info, version, disk usage.

use super::client::{DockerClient, DockerError};

impl DockerClient {
    /// Docker system information (`docker info`).
    pub async fn system_info(&self) -> Result<bollard::models::SystemInfo, DockerError> {
        self.client.info().await.map_err(DockerError::from)
    }

    /// Daemon and API version (`docker version`). Also used as the startup
    /// reachability probe.
    pub async fn version(&self) -> Result<bollard::models::SystemVersion, DockerError> {
        self.client.version().await.map_err(DockerError::from)
    }

    /// Data usage across images, containers, and volumes (`docker system df`).
    pub async fn disk_usage(&self) -> Result<bollard::models::SystemDataUsageResponse, DockerError> {
        self.client
            .df(None::<bollard::query_parameters::DataUsageOptions>)
            .await
            .map_err(DockerError::from)
    }
}
