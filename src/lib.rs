//! Vienna Live MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing personal-assistant tools,
//! grouped into portmanteaus: shopping, travel, expenses, media and planning.
//!
//! # Architecture
//!
//! - **core**: configuration, CLI, clock, entity store, error handling, the
//!   server facade and the STDIO/HTTP transports
//! - **domains**: business logic organized by bounded contexts
//!   - **records**: entity models owned by the stores
//!   - **tools**: tool registry and portmanteau definitions
//!
//! # Example
//!
//! ```rust,no_run
//! use vienna_live_mcp::core::{Config, McpServer, TransportService, system_clock};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone(), system_clock()).await?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
