//! Container tools — list, inspect, lifecycle, logs, exec, processes, stats.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{json_block, parse_args};
use crate::docker::container::LogsQuery;
use crate::mcp::protocol::{CallToolResult, ToolSpec};
use crate::state::ServerState;

pub(super) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "docker_container_list",
            description: "List containers with their status, names, and basic info",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "all": {
                        "type": "boolean",
                        "description": "Show all containers (default: false - only running)"
                    },
                    "filters": {
                        "type": "object",
                        "additionalProperties": { "type": "string" },
                        "description": "Filter containers by label, status, name, etc."
                    }
                }
            }),
        },
        ToolSpec {
            name: "docker_container_inspect",
            description: "Get detailed information about a container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" }
                },
                "required": ["containerId"]
            }),
        },
        ToolSpec {
            name: "docker_container_start",
            description: "Start a stopped container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" }
                },
                "required": ["containerId"]
            }),
        },
        ToolSpec {
            name: "docker_container_stop",
            description: "Stop a running container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" },
                    "timeout": {
                        "type": "integer",
                        "description": "Seconds to wait before killing (default: 10)"
                    }
                },
                "required": ["containerId"]
            }),
        },
        ToolSpec {
            name: "docker_container_restart",
            description: "Restart a container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" },
                    "timeout": {
                        "type": "integer",
                        "description": "Seconds to wait before killing (default: 10)"
                    }
                },
                "required": ["containerId"]
            }),
        },
        ToolSpec {
            name: "docker_container_remove",
            description: "Remove a container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" },
                    "force": { "type": "boolean", "description": "Kill a running container first" },
                    "volumes": { "type": "boolean", "description": "Also remove anonymous volumes" }
                },
                "required": ["containerId"]
            }),
        },
        ToolSpec {
            name: "docker_container_logs",
            description: "Retrieve logs from a container with optional filtering",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" },
                    "tail": {
                        "type": "integer",
                        "description": "Lines from the end of the logs (default: 100)"
                    },
                    "since": {
                        "type": "integer",
                        "description": "Only logs since this Unix timestamp (seconds)"
                    },
                    "until": {
                        "type": "integer",
                        "description": "Only logs until this Unix timestamp (seconds)"
                    },
                    "timestamps": {
                        "type": "boolean",
                        "description": "Include timestamps in the output (default: false)"
                    }
                },
                "required": ["containerId"]
            }),
        },
        ToolSpec {
            name: "docker_container_exec",
            description: "Run a command inside a running container and return its output",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" },
                    "command": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Command and arguments, argv style"
                    },
                    "workingDir": { "type": "string", "description": "Working directory inside the container" },
                    "env": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Environment entries, KEY=value"
                    },
                    "tty": { "type": "boolean", "description": "Allocate a pseudo-TTY (default: false)" }
                },
                "required": ["containerId", "command"]
            }),
        },
        ToolSpec {
            name: "docker_container_processes",
            description: "List processes running inside a container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" }
                },
                "required": ["containerId"]
            }),
        },
        ToolSpec {
            name: "docker_container_stats",
            description: "Get a single resource usage sample for a container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" }
                },
                "required": ["containerId"]
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
        "docker_container_list" => list(state, args).await,
        "docker_container_inspect" => inspect(state, args).await,
        "docker_container_start" => start(state, args).await,
        "docker_container_stop" => stop(state, args).await,
        "docker_container_restart" => restart(state, args).await,
        "docker_container_remove" => remove(state, args).await,
        "docker_container_logs" => logs(state, args).await,
        "docker_container_exec" => exec(state, args).await,
        "docker_container_processes" => processes(state, args).await,
        "docker_container_stats" => stats(state, args).await,
        _ => return None,
    })
}

#[derive(Deserialize)]
struct ListArgs {
    #[serde(default)]
    all: bool,
    #[serde(default)]
    filters: HashMap<String, String>,
}

async fn list(state: &ServerState, args: &Value) -> CallToolResult {
    let args: ListArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    let filters = args
        .filters
        .into_iter()
        .map(|(k, v)| (k, vec![v]))
        .collect();
    match state.docker.list_containers(args.all, filters).await {
        Ok(containers) => json_block(&json!({
            "count": containers.len(),
            "containers": containers,
        })),
        Err(e) => CallToolResult::error(format!("Error listing containers: {}", e)),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerIdArgs {
    container_id: String,
}

async fn inspect(state: &ServerState, args: &Value) -> CallToolResult {
    let args: ContainerIdArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state.docker.inspect_container(&args.container_id).await {
        Ok(details) => json_block(&details),
        Err(e) => CallToolResult::error(format!(
            "Error inspecting container {}: {}",
            args.container_id, e
        )),
    }
}

async fn start(state: &ServerState, args: &Value) -> CallToolResult {
    let args: ContainerIdArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state.docker.start_container(&args.container_id).await {
        Ok(()) => CallToolResult::text(format!(
            "Successfully started container {}",
            args.container_id
        )),
        Err(e) => CallToolResult::error(format!(
            "Error starting container {}: {}",
            args.container_id, e
        )),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopArgs {
    container_id: String,
    timeout: Option<u32>,
}

async fn stop(state: &ServerState, args: &Value) -> CallToolResult {
    let args: StopArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state
        .docker
        .stop_container(&args.container_id, args.timeout)
        .await
    {
        Ok(()) => CallToolResult::text(format!(
            "Successfully stopped container {}",
            args.container_id
        )),
        Err(e) => CallToolResult::error(format!(
            "Error stopping container {}: {}",
            args.container_id, e
        )),
    }
}

async fn restart(state: &ServerState, args: &Value) -> CallToolResult {
    let args: StopArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state
        .docker
        .restart_container(&args.container_id, args.timeout)
        .await
    {
        Ok(()) => CallToolResult::text(format!(
            "Successfully restarted container {}",
            args.container_id
        )),
        Err(e) => CallToolResult::error(format!(
            "Error restarting container {}: {}",
            args.container_id, e
        )),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveArgs {
    container_id: String,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    volumes: bool,
}

async fn remove(state: &ServerState, args: &Value) -> CallToolResult {
    let args: RemoveArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state
        .docker
        .remove_container(&args.container_id, args.force, args.volumes)
        .await
    {
        Ok(()) => CallToolResult::text(format!(
            "Successfully removed container {}",
            args.container_id
        )),
        Err(e) => CallToolResult::error(format!(
            "Error removing container {}: {}",
            args.container_id, e
        )),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogsArgs {
    container_id: String,
    tail: Option<u32>,
    since: Option<i64>,
    until: Option<i64>,
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
        since: args.since,
        until: args.until,
        timestamps: args.timestamps,
    };
    match state.docker.container_logs(&args.container_id, &query).await {
        Ok(logs) => {
            let log_count = logs.lines().filter(|l| !l.trim().is_empty()).count();
            json_block(&json!({
                "containerId": args.container_id,
                "logCount": log_count,
                "options": {
                    "tail": query.tail.unwrap_or(100),
                    "since": query.since,
                    "until": query.until,
                    "timestamps": query.timestamps,
                },
                "logs": logs,
            }))
        }
        Err(e) => CallToolResult::error(format!(
            "Error getting logs for container {}: {}",
            args.container_id, e
        )),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecArgs {
    container_id: String,
    command: Vec<String>,
    working_dir: Option<String>,
    #[serde(default)]
    env: Vec<String>,
    #[serde(default)]
    tty: bool,
}

async fn exec(state: &ServerState, args: &Value) -> CallToolResult {
    let args: ExecArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    if args.command.is_empty() {
        return CallToolResult::error("Invalid arguments: command must not be empty");
    }
    match state
        .docker
        .exec_command(
            &args.container_id,
            args.command,
            args.working_dir,
            args.env,
            args.tty,
        )
        .await
    {
        Ok(outcome) => json_block(&outcome),
        Err(e) => CallToolResult::error(format!(
            "Error executing command in container {}: {}",
            args.container_id, e
        )),
    }
}

async fn processes(state: &ServerState, args: &Value) -> CallToolResult {
    let args: ContainerIdArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state.docker.container_processes(&args.container_id).await {
        Ok(top) => json_block(&top),
        Err(e) => CallToolResult::error(format!(
            "Error getting processes for container {}: {}",
            args.container_id, e
        )),
    }
}

async fn stats(state: &ServerState, args: &Value) -> CallToolResult {
    let args: ContainerIdArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state.docker.container_stats(&args.container_id).await {
        Ok(sample) => json_block(&sample),
        Err(e) => CallToolResult::error(format!(
            "Error getting stats for container {}: {}",
            args.container_id, e
        )),
    }
}
