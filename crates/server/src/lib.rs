// Domain-driven module structure for the Docker MCP server.

// Core infrastructure
pub mod conf;
pub mod docker;
pub mod state;

// Protocol surface
pub mod mcp;
pub mod runtime;
