//! Tools domain module.
//!
//! Tools are the named operations MCP clients call. They are grouped into
//! portmanteaus (shopping, travel, expenses, media, planning) plus two core
//! introspection tools.
//!
//! ## Architecture
//!
//! - `definitions/` - one sub-module per portmanteau, plus `server_info.rs`
//! - `registry.rs` - flat, uniquely named tool table and dispatch
//! - `router.rs` - rmcp ToolRouter built from the registry (stdio)
//! - `handlers.rs` - handler result type and the error-payload boundary
//! - `error.rs` - registry-level errors
//!
//! ## Adding a Tool
//!
//! 1. Write a params struct (`Deserialize + JsonSchema`) and an async method
//!    `fn(self: Arc<Manager>, params) -> ToolResult` on the portmanteau manager
//! 2. Declare a `ToolSpec` next to it
//! 3. Add a `.register(...)` line to the portmanteau's `register_*_tools`
//!
//! Both transports pick the tool up from the registry.

pub mod definitions;
mod error;
mod handlers;
mod registry;
pub mod router;

pub use error::ToolError;
pub use handlers::{
    DomainError, NoParams, ToolResult, into_call_result, into_payload, is_error_payload, round1, round2,
    to_payload,
};
pub use registry::{Catalog, Portmanteau, PortmanteauInfo, PortmanteauScope, RegisteredTool, ToolRegistry, ToolSpec};
pub use router::build_tool_router;
