//! Compose tools — project status and aggregated logs.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{json_block, parse_args};
use crate::docker::container::LogsQuery;
use crate::mcp::protocol::{CallToolResult, ToolSpec};
use crate::state::ServerState;

pub(super) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "docker_compose_ps",
            description: "List the containers of a Docker Compose project",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectName": { "type": "string", "description": "Compose project name" }
                },
                "required": ["projectName"]
            }),
        },
        ToolSpec {
            name: "docker_compose_logs",
            description: "Get logs from the services of a Docker Compose project",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectName": { "type": "string", "description": "Compose project name" },
                    "services": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Only these services (default: all)"
                    },
                    "tail": {
                        "type": "integer",
                        "description": "Lines from the end per service (default: 100)"
                    },
                    "timestamps": {
                        "type": "boolean",
                        "description": "Include timestamps in the output (default: false)"
                    }
                },
                "required": ["projectName"]
            }),
        },
    ]
}

pub(super) async fn call(
    state: &ServerState,
    name: &str,
    args: &Value,
) -> Option<CallToolResult> {
    Some(match name {
        "docker_compose_ps" => ps(state, args).await,
        "docker_compose_logs" => logs(state, args).await,
        _ => return None,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PsArgs {
    project_name: String,
}

async fn ps(state: &ServerState, args: &Value) -> CallToolResult {
    let args: PsArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state.docker.compose_ps(&args.project_name).await {
        Ok(services) => json_block(&json!({
            "project": args.project_name,
            "count": services.len(),
            "services": services,
        })),
        Err(e) => CallToolResult::error(format!(
            "Error getting compose project {}: {}",
            args.project_name, e
        )),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogsArgs {
    project_name: String,
    services: Option<Vec<String>>,
    tail: Option<u32>,
    #[serde(default)]
    timestamps: bool,
}

async fn logs(state: &ServerState, args: &Value) -> CallToolResult {
    let args: LogsArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    let query = LogsQuery {
        tail: args.tail,
        timestamps: args.timestamps,
        ..Default::default()
    };
    match state
        .docker
        .compose_logs(&args.project_name, args.services.as_deref(), &query)
        .await
    {
        Ok(logs) => CallToolResult::text(logs),
        Err(e) => CallToolResult::error(format!(
            "Error getting compose logs for {}: {}",
            args.project_name, e
        )),
    }
}
