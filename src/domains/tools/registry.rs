//! Tool Registry - central registration and dispatch for all tools.
//!
//! Every tool is registered once with its name, description, parameter type
//! and an async handler. The registry derives the JSON schema from the
//! parameter type, deserializes arguments on dispatch and converts handler
//! results at the boundary. Both transports dispatch through it: the rmcp
//! router for stdio (see `router.rs`) and the JSON-RPC handler for HTTP.

use futures::FutureExt;
use futures::future::BoxFuture;
use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::error::ToolError;
use super::handlers::{ToolResult, into_payload};

// ============================================================================
// Metadata
// ============================================================================

/// A named group of related tools.
#[derive(Debug)]
pub struct Portmanteau {
    pub name: &'static str,
    pub description: &'static str,
    pub categories: &'static [&'static str],
}

/// Name and description of a single tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

impl ToolSpec {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

/// Introspection summary of one portmanteau.
#[derive(Debug, Clone, Serialize)]
pub struct PortmanteauInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub categories: Vec<&'static str>,
    pub tools: Vec<String>,
    pub tools_count: usize,
}

/// Introspection summary of the whole registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub portmanteaus: Vec<PortmanteauInfo>,
    pub tools_count: usize,
}

impl Catalog {
    /// Look up a portmanteau by exact name.
    pub fn get(&self, name: &str) -> Option<&PortmanteauInfo> {
        self.portmanteaus.iter().find(|p| p.name == name)
    }

    /// Portmanteau names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.portmanteaus.iter().map(|p| p.name).collect()
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

type BoxedHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// A tool as stored in the registry.
#[derive(Clone)]
pub struct RegisteredTool {
    tool: Tool,
    portmanteau: Option<&'static str>,
    handler: BoxedHandler,
}

impl RegisteredTool {
    /// MCP tool metadata (name, description, input schema).
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }

    /// Owning portmanteau, `None` for core tools.
    pub fn portmanteau(&self) -> Option<&'static str> {
        self.portmanteau
    }
}

/// Tool registry - flat namespace of uniquely named tools in registration
/// order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
    portmanteaus: Vec<&'static Portmanteau>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a core tool that belongs to no portmanteau.
    pub fn register<C, P, F, Fut>(&mut self, spec: ToolSpec, ctx: Arc<C>, handler: F) -> Result<(), ToolError>
    where
        C: Send + Sync + 'static,
        P: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(Arc<C>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        self.insert(None, spec, ctx, handler)
    }

    /// Open a registration scope for a portmanteau.
    pub fn portmanteau(&mut self, portmanteau: &'static Portmanteau) -> PortmanteauScope<'_> {
        if !self.portmanteaus.iter().any(|p| p.name == portmanteau.name) {
            self.portmanteaus.push(portmanteau);
        }
        PortmanteauScope {
            registry: self,
            portmanteau,
        }
    }

    fn insert<C, P, F, Fut>(
        &mut self,
        portmanteau: Option<&'static str>,
        spec: ToolSpec,
        ctx: Arc<C>,
        handler: F,
    ) -> Result<(), ToolError>
    where
        C: Send + Sync + 'static,
        P: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(Arc<C>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        if self.index.contains_key(spec.name) {
            return Err(ToolError::duplicate_name(spec.name));
        }

        let name = spec.name;
        let handler: BoxedHandler = Arc::new(move |arguments: Value| {
            match serde_json::from_value::<P>(arguments) {
                Ok(params) => {
                    let running = handler(ctx.clone(), params);
                    async move { Ok(into_payload(name, running.await)) }.boxed()
                }
                Err(e) => futures::future::ready(Err(ToolError::invalid_arguments(name, e.to_string()))).boxed(),
            }
        });

        let tool = Tool {
            name: spec.name.into(),
            description: Some(spec.description.into()),
            input_schema: schema_for_type::<P>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        };

        self.index.insert(spec.name.to_string(), self.tools.len());
        self.tools.push(RegisteredTool {
            tool,
            portmanteau,
            handler,
        });
        debug!("Registered tool '{}'", spec.name);
        Ok(())
    }

    /// Run a tool by name.
    ///
    /// `null` arguments are treated as an empty object. Domain failures come
    /// back as `Ok({"error": ...})`; only registry-level errors are `Err`.
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let Some(&position) = self.index.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::unknown_tool(name));
        };

        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        debug!("Dispatching tool '{}'", name);
        let handler = self.tools[position].handler.clone();
        handler(arguments).await
    }

    /// Registered tools in registration order. Each call starts a fresh pass.
    pub fn list_tools(&self) -> impl Iterator<Item = &Tool> + '_ {
        self.tools.iter().map(RegisteredTool::tool)
    }

    /// Look up a registered tool.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Summarise portmanteaus and their tools.
    pub fn catalog(&self) -> Catalog {
        let portmanteaus = self
            .portmanteaus
            .iter()
            .map(|p| {
                let tools: Vec<String> = self
                    .tools
                    .iter()
                    .filter(|t| t.portmanteau == Some(p.name))
                    .map(|t| t.name().to_string())
                    .collect();
                PortmanteauInfo {
                    name: p.name,
                    description: p.description,
                    categories: p.categories.to_vec(),
                    tools_count: tools.len(),
                    tools,
                }
            })
            .collect();

        Catalog {
            portmanteaus,
            tools_count: self.tools.len(),
        }
    }
}

/// Registration scope tagging every tool with its portmanteau.
pub struct PortmanteauScope<'r> {
    registry: &'r mut ToolRegistry,
    portmanteau: &'static Portmanteau,
}

impl PortmanteauScope<'_> {
    /// Register a tool under this portmanteau.
    pub fn register<C, P, F, Fut>(&mut self, spec: ToolSpec, ctx: Arc<C>, handler: F) -> Result<&mut Self, ToolError>
    where
        C: Send + Sync + 'static,
        P: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(Arc<C>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        self.registry
            .insert(Some(self.portmanteau.name), spec, ctx, handler)?;
        Ok(self)
    }
}
