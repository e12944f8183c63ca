//! Conf module — server configuration model and daemon connection resolution.

pub mod model;
pub mod resolve;
pub mod ssh;

pub use model::{ConnectionSpec, ServerConfig};
pub use resolve::{resolve, ConnectionOverrides};
