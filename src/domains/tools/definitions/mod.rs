//! Tool definitions, one sub-module per portmanteau.
//!
//! Each portmanteau exposes a manager holding the stores and clock it needs
//! and a `register_*_tools` function. [`register_all`] wires them into one
//! registry in a fixed order: core tools first, then shopping, travel,
//! expenses, media and planning.

pub mod expenses;
pub mod media;
pub mod planning;
pub mod server_info;
pub mod shopping;
pub mod travel;

use std::sync::Arc;
use tracing::info;

use crate::core::clock::SharedClock;
use crate::domains::records::Database;
use crate::domains::tools::{ToolError, ToolRegistry};

pub use expenses::{EXPENSES, ExpensesManager, register_expenses_tools};
pub use media::{MEDIA, MediaManager, register_media_tools};
pub use planning::{PLANNING, PlanningManager, register_planning_tools};
pub use server_info::{ServerInfo, register_server_tools};
pub use shopping::{SHOPPING, ShoppingManager, register_shopping_tools};
pub use travel::{TRAVEL, TravelManager, register_travel_tools};

/// Register every tool against `registry` and publish the resulting catalog
/// to the introspection tools.
pub fn register_all(
    registry: &mut ToolRegistry,
    db: &Database,
    clock: SharedClock,
    server: Arc<ServerInfo>,
) -> Result<(), ToolError> {
    register_server_tools(registry, server.clone())?;
    register_shopping_tools(registry, Arc::new(ShoppingManager::new(db, clock.clone())))?;
    register_travel_tools(registry, Arc::new(TravelManager::new(clock.clone())))?;
    register_expenses_tools(registry, Arc::new(ExpensesManager::new(db, clock.clone())))?;
    register_media_tools(registry, Arc::new(MediaManager::new(db, clock.clone())))?;
    register_planning_tools(registry, Arc::new(PlanningManager::new(db, clock)))?;

    let catalog = registry.catalog();
    info!(
        "Registered {} tools across {} portmanteaus",
        catalog.tools_count,
        catalog.portmanteaus.len()
    );
    server.publish(catalog);
    Ok(())
}
