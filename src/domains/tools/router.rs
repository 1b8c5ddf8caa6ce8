//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Each registered tool becomes one dynamic route that forwards to
//! [`ToolRegistry::dispatch`], so the stdio transport sees exactly the tools
//! and argument handling the HTTP transport sees.

use futures::FutureExt;
use rmcp::handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter};
use serde_json::Value;
use std::sync::Arc;

use super::handlers::into_call_result;
use super::registry::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let tools: Vec<_> = registry.list_tools().cloned().collect();

    tools.into_iter().fold(ToolRouter::new(), |router, tool| {
        let name = tool.name.to_string();
        let registry = registry.clone();

        router.with_route(ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
            let arguments = ctx.arguments.clone().map(Value::Object).unwrap_or(Value::Null);
            let registry = registry.clone();
            let name = name.clone();
            async move {
                registry
                    .dispatch(&name, arguments)
                    .await
                    .map(into_call_result)
                    .map_err(|e| e.into_mcp())
            }
            .boxed()
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::{Portmanteau, ToolResult, ToolSpec};
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    struct TestServer {}

    #[derive(Deserialize, JsonSchema)]
    struct PingParams {}

    async fn ping(_ctx: Arc<()>, _params: PingParams) -> ToolResult {
        Ok(json!({ "pong": true }))
    }

    static GROUP: Portmanteau = Portmanteau {
        name: "ping_manager",
        description: "Ping",
        categories: &[],
    };

    #[test]
    fn test_registry_matches_router() {
        let mut registry = ToolRegistry::new();
        registry
            .portmanteau(&GROUP)
            .register(ToolSpec::new("ping", "Ping"), Arc::new(()), ping)
            .unwrap()
            .register(ToolSpec::new("ping_again", "Ping again"), Arc::new(()), ping)
            .unwrap();
        let registry = Arc::new(registry);

        let router: ToolRouter<TestServer> = build_tool_router(registry.clone());
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.to_string()).collect();

        assert_eq!(router_names.len(), registry.len());
        for tool in registry.list_tools() {
            assert!(router_names.contains(&tool.name.to_string()));
        }
    }
}
