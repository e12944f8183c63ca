//! Container domain — list, inspect, lifecycle, logs, processes, stats.

use std::collections::HashMap;

use bollard::models::{ContainerInspectResponse, ContainerSummary};
use bollard::query_parameters::{
    ListContainersOptions, LogsOptions, RemoveContainerOptions, RestartContainerOptions,
    StatsOptions, StopContainerOptions, TopOptions,
};
use bytes::BytesMut;
use chrono::DateTime;
use futures_util::stream::StreamExt;

use super::client::{DockerClient, DockerError};
use super::stream;

/// Port mapping as presented to tool callers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PortBinding {
    pub container_port: u16,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,
}

/// Compact container summary derived from the list API: short id, cleaned
/// name, and an ISO-8601 created timestamp.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContainerBrief {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
    pub status: String,
    pub ports: Vec<PortBinding>,
    pub created: String,
    pub labels: HashMap<String, String>,
}

impl From<ContainerSummary> for ContainerBrief {
    fn from(s: ContainerSummary) -> Self {
        let ports = s
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|p| PortBinding {
                container_port: p.private_port,
                protocol: p
                    .typ
                    .map(|t| t.to_string().to_lowercase())
                    .unwrap_or_else(|| "tcp".to_string()),
                host_ip: if p.public_port.is_some() { p.ip } else { None },
                host_port: p.public_port,
            })
            .collect();

        let created = s
            .created
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();

        Self {
            id: s.id.map(short_id).unwrap_or_default(),
            name: s
                .names
                .as_deref()
                .and_then(|n| n.first())
                .map(|n| n.trim_start_matches('/'))
                .unwrap_or("unnamed")
                .to_string(),
            image: s.image.unwrap_or_default(),
            state: s
                .state
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".into()),
            status: s.status.unwrap_or_default(),
            ports,
            created,
            labels: s.labels.unwrap_or_default(),
        }
    }
}

/// First 12 characters of a container id, Docker CLI style.
pub fn short_id(id: impl AsRef<str>) -> String {
    let id = id.as_ref();
    id.chars().take(12).collect()
}

/// Options for one-shot log collection.
#[derive(Debug, Clone, Default)]
pub struct LogsQuery {
    /// Number of lines from the end; `None` means the last 100.
    pub tail: Option<u32>,
    /// Unix timestamp (seconds) to start from.
    pub since: Option<i64>,
    /// Unix timestamp (seconds) to stop at.
    pub until: Option<i64>,
    pub timestamps: bool,
}

impl DockerClient {
    pub async fn list_containers(
        &self,
        all: bool,
        filters: HashMap<String, Vec<String>>,
    ) -> Result<Vec<ContainerBrief>, DockerError> {
        let options = Some(ListContainersOptions {
            all,
            filters: if filters.is_empty() {
                None
            } else {
                Some(filters)
            },
            ..Default::default()
        });
        let containers = self.client.list_containers(options).await?;
        Ok(containers.into_iter().map(ContainerBrief::from).collect())
    }

    pub async fn inspect_container(
        &self,
        id: &str,
    ) -> Result<ContainerInspectResponse, DockerError> {
        self.client
            .inspect_container(id, None)
            .await
            .map_err(|e| not_found_or(e, id))
    }

    /// Start a stopped container.
    pub async fn start_container(&self, id: &str) -> Result<(), DockerError> {
        self.client
            .start_container(id, None)
            .await
            .map_err(|e| not_found_or(e, id))
    }

    /// Stop a running container with an optional timeout (in seconds).
    pub async fn stop_container(
        &self,
        id: &str,
        timeout_secs: Option<u32>,
    ) -> Result<(), DockerError> {
        let options = timeout_secs.map(|t| StopContainerOptions {
            t: Some(t as i32),
            ..Default::default()
        });
        self.client
            .stop_container(id, options)
            .await
            .map_err(|e| not_found_or(e, id))
    }

    /// Restart a container with an optional timeout (in seconds).
    pub async fn restart_container(
        &self,
        id: &str,
        timeout_secs: Option<u32>,
    ) -> Result<(), DockerError> {
        let options = timeout_secs.map(|t| RestartContainerOptions {
            t: Some(t as i32),
            ..Default::default()
        });
        self.client
            .restart_container(id, options)
            .await
            .map_err(|e| not_found_or(e, id))
    }

    /// Remove a container, optionally forcing and removing its volumes.
    pub async fn remove_container(
        &self,
        id: &str,
        force: bool,
        remove_volumes: bool,
    ) -> Result<(), DockerError> {
        let options = Some(RemoveContainerOptions {
            force,
            v: remove_volumes,
            ..Default::default()
        });
        self.client
            .remove_container(id, options)
            .await
            .map_err(|e| not_found_or(e, id))
    }

    /// Collect container logs into one decoded text block.
    ///
    /// The collected bytes are demultiplexed when they carry the Engine's
    /// framing; TTY output is passed through unchanged.
    pub async fn container_logs(
        &self,
        id: &str,
        query: &LogsQuery,
    ) -> Result<String, DockerError> {
        // NOTE: Bollard v0.20 requires i32 for since/until (Unix seconds).
        let since = query
            .since
            .unwrap_or(0)
            .clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let until = query
            .until
            .unwrap_or(0)
            .clamp(i32::MIN as i64, i32::MAX as i64) as i32;

        let options = LogsOptions {
            follow: false,
            stdout: true,
            stderr: true,
            since,
            until,
            timestamps: query.timestamps,
            tail: query.tail.unwrap_or(100).to_string(),
        };

        let mut log_stream = self.client.logs(id, Some(options));
        let mut raw = BytesMut::new();
        while let Some(chunk) = log_stream.next().await {
            let output = chunk.map_err(|e| not_found_or(e, id))?;
            raw.extend_from_slice(&output.into_bytes());
        }

        Ok(stream::decode_output(&raw))
    }

    /// List processes running inside a container (`docker top`).
    pub async fn container_processes(
        &self,
        id: &str,
    ) -> Result<bollard::models::ContainerTopResponse, DockerError> {
        self.client
            .top_processes(id, None::<TopOptions>)
            .await
            .map_err(|e| not_found_or(e, id))
    }

    /// One stats sample for a container.
    pub async fn container_stats(
        &self,
        id: &str,
    ) -> Result<bollard::models::ContainerStatsResponse, DockerError> {
        let options = Some(StatsOptions {
            stream: false,
            ..Default::default()
        });
        let mut stats = self.client.stats(id, options);
        match stats.next().await {
            Some(Ok(sample)) => Ok(sample),
            Some(Err(e)) => Err(not_found_or(e, id)),
            None => Err(DockerError::ContainerNotFound(id.to_string())),
        }
    }
}

/// Map a 404 onto [`DockerError::ContainerNotFound`], everything else onto
/// the bollard error.
fn not_found_or(e: bollard::errors::Error, id: &str) -> DockerError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => DockerError::ContainerNotFound(id.to_string()),
        other => DockerError::BollardError(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_truncates_to_twelve_chars() {
        assert_eq!(
            short_id("0123456789abcdef0123456789abcdef"),
            "0123456789ab"
        );
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn brief_from_empty_summary_uses_fallbacks() {
        let brief = ContainerBrief::from(ContainerSummary::default());
        assert_eq!(brief.id, "");
        assert_eq!(brief.name, "unnamed");
        assert_eq!(brief.state, "unknown");
        assert!(brief.ports.is_empty());
        assert_eq!(brief.created, "");
    }

    #[test]
    fn brief_cleans_name_and_renders_created() {
        let summary = ContainerSummary {
            id: Some("0123456789abcdef0123456789abcdef".to_string()),
            names: Some(vec!["/web".to_string()]),
            image: Some("nginx:latest".to_string()),
            created: Some(1_700_000_000),
            ..Default::default()
        };
        let brief = ContainerBrief::from(summary);
        assert_eq!(brief.id, "0123456789ab");
        assert_eq!(brief.name, "web");
        assert!(brief.created.starts_with("2023-11-14T"));
    }

    #[test]
    fn brief_keeps_host_ip_only_for_published_ports() {
        use bollard::models::{PortSummary, PortSummaryTypeEnum};

        let summary = ContainerSummary {
            ports: Some(vec![
                PortSummary {
                    private_port: 80,
                    public_port: Some(8080),
                    ip: Some("0.0.0.0".to_string()),
                    typ: Some(PortSummaryTypeEnum::TCP),
                },
                PortSummary {
                    private_port: 9000,
                    public_port: None,
                    ip: Some("0.0.0.0".to_string()),
                    typ: None,
                },
            ]),
            ..Default::default()
        };
        let brief = ContainerBrief::from(summary);
        assert_eq!(brief.ports.len(), 2);
        assert_eq!(brief.ports[0].host_port, Some(8080));
        assert_eq!(brief.ports[0].host_ip.as_deref(), Some("0.0.0.0"));
        assert_eq!(brief.ports[0].protocol, "tcp");
        assert_eq!(brief.ports[1].host_ip, None);
        assert_eq!(brief.ports[1].protocol, "tcp");
    }
}
