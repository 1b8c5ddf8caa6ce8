//! Error types and handling for the MCP server.
//!
//! A unified error type for startup and infrastructure failures. Tool-level
//! failures never reach it: domain errors become `{"error": ...}` payloads
//! and registry errors become protocol faults.

use thiserror::Error;

use super::store::StoreError;
use super::transport::TransportError;
use crate::domains::tools::ToolError;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tool registry.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Error from an entity store or its persistence backend.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Error from the transport layer.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
