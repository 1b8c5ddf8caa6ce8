//! The handler boundary.
//!
//! Every tool handler returns a [`ToolResult`]. The registry converts
//! `Err(DomainError)` into an `{"error": message}` payload so domain
//! conditions never reach the transport as faults.

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::warn;

use crate::core::store::StoreError;

/// Result of a tool handler.
pub type ToolResult = Result<Value, DomainError>;

/// Parameters of a tool that takes no arguments.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Expected failures of a domain operation.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Entity store failure (not found, validation, confirmation, persistence).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A parameter is outside its allowed range.
    #[error("{0}")]
    Validation(String),

    /// A lookup in static reference data found nothing.
    #[error("{0}")]
    NotFound(String),

    /// A payload could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Serialize a value into a payload.
pub fn to_payload<T: Serialize>(value: &T) -> ToolResult {
    Ok(serde_json::to_value(value)?)
}

/// Flatten a handler result into the payload returned to the caller.
pub fn into_payload(tool: &str, result: ToolResult) -> Value {
    match result {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Tool '{}' failed: {}", tool, e);
            json!({ "error": e.to_string() })
        }
    }
}

/// Whether a payload is an error payload.
pub fn is_error_payload(payload: &Value) -> bool {
    payload.get("error").is_some()
}

/// Wrap a payload as an MCP tool result: pretty JSON text, plus structured
/// content when the payload is an object.
pub fn into_call_result(payload: Value) -> CallToolResult {
    let is_error = is_error_payload(&payload);
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    let structured_content = payload.is_object().then_some(payload);

    CallToolResult {
        content: vec![Content::text(text)],
        structured_content,
        is_error: Some(is_error),
        meta: None,
    }
}

/// Round to two decimal places for currency amounts.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal place for percentages.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_become_error_payloads() {
        let payload = into_payload(
            "update_expense",
            Err(StoreError::not_found("Expense", 7).into()),
        );
        assert_eq!(payload, json!({ "error": "Expense 7 not found" }));
        assert!(is_error_payload(&payload));
    }

    #[test]
    fn test_call_result_marks_errors() {
        let ok = into_call_result(json!({ "success": true }));
        assert_eq!(ok.is_error, Some(false));
        assert!(ok.structured_content.is_some());

        let err = into_call_result(json!({ "error": "boom" }));
        assert_eq!(err.is_error, Some(true));

        let list = into_call_result(json!([1, 2]));
        assert!(list.structured_content.is_none());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(42.499), 42.5);
        assert_eq!(round1(33.333), 33.3);
    }
}
