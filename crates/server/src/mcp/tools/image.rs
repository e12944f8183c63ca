//! Image tools — list, inspect, pull, remove.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{json_block, parse_args};
use crate::mcp::protocol::{CallToolResult, ToolSpec};
use crate::state::ServerState;

pub(super) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "docker_image_list",
            description: "List images on the Docker host",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "all": {
                        "type": "boolean",
                        "description": "Include intermediate images (default: false)"
                    }
                }
            }),
        },
        ToolSpec {
            name: "docker_image_inspect",
            description: "Get detailed information about an image",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "imageId": { "type": "string", "description": "Image ID or tag" }
                },
                "required": ["imageId"]
            }),
        },
        ToolSpec {
            name: "docker_image_pull",
            description: "Pull an image from a registry",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "image": { "type": "string", "description": "Image name, e.g. nginx" },
                    "tag": { "type": "string", "description": "Tag to pull (default: latest)" }
                },
                "required": ["image"]
            }),
        },
        ToolSpec {
            name: "docker_image_remove",
            description: "Remove an image",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "imageId": { "type": "string", "description": "Image ID or tag" },
                    "force": { "type": "boolean", "description": "Force removal" },
                    "noPrune": { "type": "boolean", "description": "Keep untagged parent layers" }
                },
                "required": ["imageId"]
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
        "docker_image_list" => list(state, args).await,
        "docker_image_inspect" => inspect(state, args).await,
        "docker_image_pull" => pull(state, args).await,
        "docker_image_remove" => remove(state, args).await,
        _ => return None,
    })
}

#[derive(Deserialize)]
struct ListArgs {
    #[serde(default)]
    all: bool,
}

async fn list(state: &ServerState, args: &Value) -> CallToolResult {
    let args: ListArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state.docker.list_images(args.all).await {
        Ok(images) => json_block(&json!({
            "count": images.len(),
            "images": images,
        })),
        Err(e) => CallToolResult::error(format!("Error listing images: {}", e)),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageIdArgs {
    image_id: String,
}

async fn inspect(state: &ServerState, args: &Value) -> CallToolResult {
    let args: ImageIdArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state.docker.inspect_image(&args.image_id).await {
        Ok(details) => json_block(&details),
        Err(e) => {
            CallToolResult::error(format!("Error inspecting image {}: {}", args.image_id, e))
        }
    }
}

#[derive(Deserialize)]
struct PullArgs {
    image: String,
    tag: Option<String>,
}

async fn pull(state: &ServerState, args: &Value) -> CallToolResult {
    let args: PullArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    let tag = args.tag.as_deref().unwrap_or("latest");
    match state.docker.pull_image(&args.image, tag, None).await {
        Ok(progress) => json_block(&json!({
            "image": format!("{}:{}", args.image, tag),
            "progress": progress,
        })),
        Err(e) => CallToolResult::error(format!("Error pulling image {}: {}", args.image, e)),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveArgs {
    image_id: String,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    no_prune: bool,
}

async fn remove(state: &ServerState, args: &Value) -> CallToolResult {
    let args: RemoveArgs = match parse_args(args) {
        Ok(a) => a,
        Err(e) => return *e,
    };
    match state
        .docker
        .remove_image(&args.image_id, args.force, args.no_prune)
        .await
    {
        Ok(deleted) => json_block(&deleted),
        Err(e) => CallToolResult::error(format!("Error removing image {}: {}", args.image_id, e)),
    }
}
