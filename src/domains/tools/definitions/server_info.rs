//! Server introspection tools.
//!
//! These belong to no portmanteau. The catalog they report is published once
//! every portmanteau has registered.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::core::clock::SharedClock;
use crate::domains::tools::{Catalog, NoParams, ToolError, ToolRegistry, ToolResult, ToolSpec, to_payload};

pub const GET_SERVER_STATUS: ToolSpec = ToolSpec::new(
    "get_server_status",
    "Get server name, version, uptime, storage backend and the registered portmanteaus.",
);

pub const GET_PORTMANTEAU_INFO: ToolSpec = ToolSpec::new(
    "get_portmanteau_info",
    "Get the description, categories and tools of one portmanteau.",
);

/// Parameters for `get_portmanteau_info`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PortmanteauInfoParams {
    /// Portmanteau name, e.g. "expenses_manager".
    pub portmanteau: String,
}

/// Handlers for the introspection tools.
pub struct ServerInfo {
    name: String,
    version: String,
    storage_backend: String,
    started_at: DateTime<Utc>,
    clock: SharedClock,
    catalog: OnceLock<Catalog>,
}

impl ServerInfo {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        storage_backend: impl Into<String>,
        clock: SharedClock,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            storage_backend: storage_backend.into(),
            started_at: clock.utc(),
            clock,
            catalog: OnceLock::new(),
        }
    }

    /// Freeze the registry summary reported by the tools.
    pub fn publish(&self, catalog: Catalog) {
        if self.catalog.set(catalog).is_err() {
            warn!("Tool catalog already published; ignoring update");
        }
    }

    fn catalog(&self) -> &Catalog {
        static EMPTY: OnceLock<Catalog> = OnceLock::new();
        self.catalog.get().unwrap_or_else(|| EMPTY.get_or_init(Catalog::default))
    }

    pub async fn get_server_status(self: Arc<Self>, _params: NoParams) -> ToolResult {
        let catalog = self.catalog();
        let uptime = self.clock.utc() - self.started_at;

        Ok(json!({
            "name": self.name,
            "version": self.version,
            "status": "running",
            "started_at": self.started_at,
            "uptime_seconds": uptime.num_seconds().max(0),
            "storage_backend": self.storage_backend,
            "portmanteaus": catalog.names(),
            "tools_count": catalog.tools_count,
        }))
    }

    pub async fn get_portmanteau_info(self: Arc<Self>, params: PortmanteauInfoParams) -> ToolResult {
        let catalog = self.catalog();
        match catalog.get(&params.portmanteau) {
            Some(portmanteau) => {
                info!("Described portmanteau {}", portmanteau.name);
                to_payload(portmanteau)
            }
            None => Ok(json!({
                "error": format!("Unknown portmanteau: {}", params.portmanteau),
                "available_portmanteaus": catalog.names(),
            })),
        }
    }
}

/// Register the introspection tools.
pub fn register_server_tools(registry: &mut ToolRegistry, server: Arc<ServerInfo>) -> Result<(), ToolError> {
    registry.register(GET_SERVER_STATUS, server.clone(), ServerInfo::get_server_status)?;
    registry.register(GET_PORTMANTEAU_INFO, server, ServerInfo::get_portmanteau_info)?;
    Ok(())
}
