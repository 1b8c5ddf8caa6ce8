//! Transport layer for the MCP server.
//!
//! - **STDIO**: rmcp over standard input/output (always available, default)
//! - **HTTP**: JSON-RPC 2.0 over POST requests (feature: `http`, on by default)
//!
//! Both transports dispatch tool calls through the same
//! [`ToolRegistry`](crate::domains::tools::ToolRegistry).

mod config;
mod error;
mod service;
pub mod stdio;

#[cfg(feature = "http")]
pub mod http;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
