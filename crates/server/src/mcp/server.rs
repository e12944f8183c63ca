//! MCP dispatch — one JSON line in, at most one JSON line out.

use serde_json::Value;
use tracing::{debug, warn};

use super::protocol::{
    CallToolParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR,
    INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};
use super::tools;
use crate::state::SharedState;

pub struct McpServer {
    state: SharedState,
}

impl McpServer {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Handle one raw line from the transport. Returns the serialized
    /// response line, or `None` when no reply is due (notifications).
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.dispatch(request).await?,
            Err(e) => {
                warn!("Unparseable request: {}", e);
                JsonRpcResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {}", e))
            }
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                // A response that cannot be serialized is a server bug; fall
                // back to a minimal error so the peer is not left hanging.
                warn!("Failed to serialize response: {}", e);
                Some(
                    serde_json::to_string(&JsonRpcResponse::failure(
                        response.id,
                        INTERNAL_ERROR,
                        "Internal error",
                    ))
                    .unwrap_or_default(),
                )
            }
        }
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "Dispatching request");

        // Notifications get no reply regardless of method.
        let id = match request.id {
            Some(id) => id,
            None => return None,
        };

        let response = match request.method.as_str() {
            "initialize" => {
                let init = InitializeResult::new(
                    self.state.config.name.clone(),
                    self.state.config.version.clone(),
                );
                match serde_json::to_value(init) {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(e) => JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string()),
                }
            }
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => {
                JsonRpcResponse::success(id, serde_json::json!({ "tools": tools::specs() }))
            }
            "tools/call" => self.call_tool(id, request.params).await,
            other => JsonRpcResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        };

        Some(response)
    }

    async fn call_tool(&self, id: Value, params: Value) -> JsonRpcResponse {
        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::failure(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid tools/call params: {}", e),
                )
            }
        };

        match tools::call(&self.state, &params.name, &params.arguments).await {
            Some(result) => match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string()),
            },
            None => JsonRpcResponse::failure(
                id,
                INVALID_PARAMS,
                format!("Unknown tool: {}", params.name),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{ConnectionSpec, ServerConfig};
    use crate::docker::client::DockerClient;
    use crate::state::ServerState;
    use std::sync::Arc;

    fn test_server() -> McpServer {
        let config = ServerConfig {
            name: "docker-mcp-server".to_string(),
            version: "0.1.0".to_string(),
            connection: ConnectionSpec::Local,
        };
        let state = Arc::new(ServerState::new(config, DockerClient::disconnected()));
        McpServer::new(state)
    }

    async fn roundtrip(line: &str) -> Value {
        let reply = test_server().handle_line(line).await.expect("expected a reply");
        serde_json::from_str(&reply).expect("reply is valid JSON")
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let reply =
            roundtrip(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#).await;
        assert_eq!(reply["id"], 1);
        assert_eq!(reply["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(reply["result"]["serverInfo"]["name"], "docker-mcp-server");
        assert!(reply["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn tools_list_is_nonempty() {
        let reply = roundtrip(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let tools = reply["result"]["tools"].as_array().expect("tools array");
        assert!(!tools.is_empty());
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[tokio::test]
    async fn ping_returns_empty_object() {
        let reply = roundtrip(r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#).await;
        assert_eq!(reply["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let reply = roundtrip(r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#).await;
        assert_eq!(reply["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let reply = test_server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn malformed_json_yields_parse_error() {
        let reply = roundtrip("{not json").await;
        assert_eq!(reply["error"]["code"], PARSE_ERROR);
        assert_eq!(reply["id"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let reply = roundtrip(
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"docker_bogus","arguments":{}}}"#,
        )
        .await;
        assert_eq!(reply["error"]["code"], INVALID_PARAMS);
    }
}
