//! Registry-level tool errors.
//!
//! These indicate a caller or integration bug and are the only tool failures
//! that surface as protocol faults. Domain failures are converted to an
//! `{"error": ...}` payload instead (see [`DomainError`](super::DomainError)).

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// JSON-RPC "invalid params" code.
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC "internal error" code.
pub const INTERNAL_ERROR: i32 = -32603;

/// Errors raised by the [`ToolRegistry`](super::ToolRegistry).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not match the tool's parameter schema.
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

impl ToolError {
    /// Create a "duplicate name" error.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    /// Create an "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create an "invalid arguments" error.
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// JSON-RPC error code for the HTTP transport.
    pub fn code(&self) -> i32 {
        match self {
            Self::DuplicateName(_) => INTERNAL_ERROR,
            Self::UnknownTool(_) | Self::InvalidArguments { .. } => INVALID_PARAMS,
        }
    }

    /// Convert into an rmcp protocol error for the stdio transport.
    pub fn into_mcp(self) -> McpError {
        match self {
            Self::DuplicateName(_) => McpError::internal_error(self.to_string(), None),
            Self::UnknownTool(_) | Self::InvalidArguments { .. } => {
                McpError::invalid_params(self.to_string(), None)
            }
        }
    }
}
