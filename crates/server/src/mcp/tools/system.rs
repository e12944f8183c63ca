//! System tools — daemon info, version, disk usage.

use serde_json::{json, Value};

use super::json_block;
use crate::mcp::protocol::{CallToolResult, ToolSpec};
use crate::state::ServerState;

pub(super) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "docker_system_info",
            description: "Get Docker system information",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolSpec {
            name: "docker_system_version",
            description: "Get Docker daemon and API version",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolSpec {
            name: "docker_system_df",
            description: "Show Docker disk usage across images, containers, and volumes",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

pub(super) async fn call(
    state: &ServerState,
    name: &str,
    _args: &Value,
) -> Option<CallToolResult> {
    Some(match name {
        "docker_system_info" => match state.docker.system_info().await {
            Ok(info) => json_block(&info),
            Err(e) => CallToolResult::error(format!("Error getting system info: {}", e)),
        },
        "docker_system_version" => match state.docker.version().await {
            Ok(version) => json_block(&version),
            Err(e) => CallToolResult::error(format!("Error getting Docker version: {}", e)),
        },
        "docker_system_df" => match state.docker.disk_usage().await {
            Ok(df) => json_block(&df),
            Err(e) => CallToolResult::error(format!("Error getting disk usage: {}", e)),
        },
        _ => return None,
    })
}
