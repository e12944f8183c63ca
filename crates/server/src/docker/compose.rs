//! Compose domain — project status and aggregated logs via compose labels.
//!
//! Compose files are not parsed; projects are discovered through the labels
//! the compose CLI stamps onto the containers it creates.

use std::collections::HashMap;

use super::client::{DockerClient, DockerError};
use super::container::{short_id, LogsQuery, PortBinding};

/// Label carrying the compose project name.
pub const PROJECT_LABEL: &str = "com.docker.compose.project";
/// Label carrying the compose service name.
pub const SERVICE_LABEL: &str = "com.docker.compose.service";

/// One service container within a compose project.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ComposeService {
    pub id: String,
    pub name: String,
    pub service: String,
    pub state: String,
    pub status: String,
    pub image: String,
    pub ports: Vec<PortBinding>,
}

impl DockerClient {
    /// List the containers belonging to a compose project.
    pub async fn compose_ps(&self, project: &str) -> Result<Vec<ComposeService>, DockerError> {
        let briefs = self.list_containers(true, project_filter(project)).await?;
        Ok(briefs
            .into_iter()
            .map(|c| {
                let service = c
                    .labels
                    .get(SERVICE_LABEL)
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                ComposeService {
                    id: c.id,
                    name: c.name,
                    service,
                    state: c.state,
                    status: c.status,
                    image: c.image,
                    ports: c.ports,
                }
            })
            .collect())
    }

    /// Aggregate logs across a project's containers, one headed section per
    /// service. A failure on one container does not abort the others; its
    /// section carries the error instead.
    pub async fn compose_logs(
        &self,
        project: &str,
        services: Option<&[String]>,
        query: &LogsQuery,
    ) -> Result<String, DockerError> {
        let containers = self.compose_ps(project).await?;
        let mut sections = Vec::new();

        for container in containers {
            if let Some(wanted) = services {
                if !wanted.contains(&container.service) {
                    continue;
                }
            }

            let header = format!("=== {} ({}) ===", container.service, short_id(&container.id));
            match self.container_logs(&container.id, query).await {
                Ok(logs) => sections.push(format!("{}\n{}", header, logs)),
                Err(e) => {
                    tracing::warn!(
                        "Failed to fetch logs for compose service {}: {}",
                        container.service,
                        e
                    );
                    sections.push(format!("{}\nError fetching logs: {}", header, e));
                }
            }
        }

        Ok(sections.join("\n\n"))
    }
}

/// Filter map selecting containers stamped with a project's label.
fn project_filter(project: &str) -> HashMap<String, Vec<String>> {
    let mut filters = HashMap::new();
    filters.insert(
        "label".to_string(),
        vec![format!("{}={}", PROJECT_LABEL, project)],
    );
    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_filter_targets_the_compose_label() {
        let filters = project_filter("myapp");
        assert_eq!(
            filters.get("label"),
            Some(&vec!["com.docker.compose.project=myapp".to_string()])
        );
    }
}
