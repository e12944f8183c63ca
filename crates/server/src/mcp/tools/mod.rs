//! Tool handlers, grouped by domain.
//!
//! Every tool is a thin schema plus a pass-through call into the Docker
//! client; failures come back as `isError` tool results, never as protocol
//! errors.

pub mod compose;
pub mod container;
pub mod image;
pub mod system;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::mcp::protocol::{CallToolResult, ToolSpec};
use crate::state::ServerState;

/// Specs for every registered tool, in listing order.
pub fn specs() -> Vec<ToolSpec> {
    let mut all = container::specs();
    all.extend(image::specs());
    all.extend(system::specs());
    all.extend(compose::specs());
    all
}

/// Dispatch a `tools/call` by name. `None` means no such tool.
pub async fn call(state: &ServerState, name: &str, args: &Value) -> Option<CallToolResult> {
    if let Some(result) = container::call(state, name, args).await {
        return Some(result);
    }
    if let Some(result) = image::call(state, name, args).await {
        return Some(result);
    }
    if let Some(result) = system::call(state, name, args).await {
        return Some(result);
    }
    compose::call(state, name, args).await
}

/// Deserialize tool arguments, turning schema violations into an error
/// result for the caller.
pub(crate) fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T, Box<CallToolResult>> {
    serde_json::from_value(args.clone())
        .map_err(|e| Box::new(CallToolResult::error(format!("Invalid arguments: {}", e))))
}

/// Pretty-print a structured payload into a text block.
pub(crate) fn json_block(value: &impl serde::Serialize) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(text) => CallToolResult::text(text),
        Err(e) => CallToolResult::error(format!("Failed to serialize result: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique_and_snake_cased() {
        let specs = specs();
        assert!(!specs.is_empty());

        let mut seen = HashSet::new();
        for spec in &specs {
            assert!(seen.insert(spec.name), "duplicate tool {}", spec.name);
            assert!(spec.name.starts_with("docker_"), "{}", spec.name);
            assert!(!spec.description.is_empty(), "{}", spec.name);
        }
    }

    #[test]
    fn every_schema_is_an_object() {
        for spec in specs() {
            assert_eq!(
                spec.input_schema.get("type").and_then(|t| t.as_str()),
                Some("object"),
                "{}",
                spec.name
            );
        }
    }

    #[test]
    fn expected_tools_are_registered() {
        let names: HashSet<&str> = specs().iter().map(|s| s.name).collect();
        for expected in [
            "docker_container_list",
            "docker_container_inspect",
            "docker_container_start",
            "docker_container_stop",
            "docker_container_restart",
            "docker_container_remove",
            "docker_container_logs",
            "docker_container_exec",
            "docker_container_processes",
            "docker_container_stats",
            "docker_image_list",
            "docker_image_inspect",
            "docker_image_pull",
            "docker_image_remove",
            "docker_system_info",
            "docker_system_version",
            "docker_system_df",
            "docker_compose_ps",
            "docker_compose_logs",
        ] {
            assert!(names.contains(expected), "missing tool {}", expected);
        }
    }
}
