//! MCP Server implementation and lifecycle management.
//!
//! [`McpServer`] is the facade: it opens the entity stores, registers every
//! portmanteau against one [`ToolRegistry`] and hands that registry to the
//! transports. STDIO goes through the rmcp [`ToolRouter`] built from the
//! registry; HTTP calls [`McpServer::call_tool`] directly.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use super::clock::SharedClock;
use super::config::Config;
use super::error::Result as ServerResult;
use crate::domains::records::Database;
use crate::domains::tools::definitions::{ServerInfo as ServerInfoTools, register_all};
use crate::domains::tools::{ToolError, ToolRegistry, build_tool_router, into_call_result};

const INSTRUCTIONS: &str = "Personal assistant tools for life in Vienna, grouped into portmanteaus: \
shopping_manager, travel_manager, expenses_manager, media_manager and planning_manager. \
Call get_server_status for an overview and get_portmanteau_info for the tools of one group. \
Results that failed carry an \"error\" key.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Every registered tool.
    registry: Arc<ToolRegistry>,

    /// Tool router for the STDIO transport.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Open the configured storage backend and register all tools.
    pub async fn new(config: Config, clock: SharedClock) -> ServerResult<Self> {
        let backend = config.storage_backend()?;
        let db = Database::open(&backend).await?;
        Self::with_database(config, db, clock)
    }

    /// Build a server over an already opened database.
    pub fn with_database(config: Config, db: Database, clock: SharedClock) -> ServerResult<Self> {
        let info = Arc::new(ServerInfoTools::new(
            config.server.name.clone(),
            config.server.version.clone(),
            db.backend(),
            clock.clone(),
        ));

        let mut registry = ToolRegistry::new();
        register_all(&mut registry, &db, clock, info)?;
        let registry = Arc::new(registry);
        info!("Server initialized with {} tools", registry.len());

        Ok(Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            registry,
            config: Arc::new(config),
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Usage notes sent to clients on initialize.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    /// The shared tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools in MCP wire shape.
    pub fn list_tools(&self) -> Vec<Value> {
        self.registry
            .list_tools()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name and wrap the payload as an MCP tool result.
    ///
    /// Only registry errors are `Err`; domain errors come back as a result
    /// with `isError: true`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> std::result::Result<Value, ToolError> {
        let payload = self.registry.dispatch(name, arguments).await?;
        let result = into_call_result(payload);
        serde_json::to_value(result).map_err(|e| ToolError::invalid_arguments(name, e.to_string()))
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::NaiveDate;

    fn server() -> McpServer {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 12, 15).unwrap()).shared();
        McpServer::with_database(Config::default(), Database::in_memory(), clock).unwrap()
    }

    #[test]
    fn test_router_and_registry_agree() {
        let server = server();
        let listed = server.list_tools();
        assert_eq!(listed.len(), server.registry().len());
        assert_eq!(server.tool_router.list_all().len(), listed.len());
        assert!(listed.iter().any(|t| t["name"] == "get_server_status"));
    }

    #[tokio::test]
    async fn test_call_tool_wraps_payload() {
        let server = server();
        let result = server.call_tool("get_server_status", json!({})).await.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["structuredContent"]["name"], "vienna-live-mcp");
        assert_eq!(result["content"][0]["type"], "text");
    }

    #[tokio::test]
    async fn test_domain_error_is_flagged_not_raised() {
        let server = server();
        let result = server
            .call_tool("complete_todo", json!({ "todo_id": 99 }))
            .await
            .unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"], "Todo 99 not found");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let server = server();
        let result = server.call_tool("play_music", json!({})).await;
        assert_eq!(result, Err(ToolError::unknown_tool("play_music")));
    }

    #[tokio::test]
    async fn test_unsupported_storage_fails_startup() {
        let mut config = Config::default();
        config.storage.database_url = "postgres://localhost/vienna".into();
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 12, 15).unwrap()).shared();
        assert!(McpServer::new(config, clock).await.is_err());
    }
}
