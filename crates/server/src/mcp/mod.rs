//! MCP surface — JSON-RPC 2.0 protocol types, dispatch, and tool handlers.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
