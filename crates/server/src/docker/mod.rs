//! Docker domain — daemon client, transports, and engine operations.
//!
//! [`client`] owns the connection; domain methods live in sibling modules
//! (`container`, `image`, `system`, `exec`, `compose`) which add
//! `impl DockerClient` blocks. [`stream`] decodes the multiplexed
//! attach/logs wire format.

pub mod client;
pub mod compose;
pub mod container;
pub mod exec;
pub mod image;
pub mod stream;
pub mod system;
pub mod tunnel;
