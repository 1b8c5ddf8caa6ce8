//! Shopping lists and items.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::ShoppingManager;
use crate::core::store::{Entity, Query};
use crate::domains::records::{ShoppingItem, ShoppingItemUpdate, ShoppingList};
use crate::domains::tools::{ToolResult, ToolSpec};

pub const LIST_CREATE: ToolSpec = ToolSpec::new(
    "shopping_list_create",
    "Create a new shopping list with an optional description and preferred store.",
);

pub const LIST_ADD_ITEM: ToolSpec = ToolSpec::new(
    "shopping_list_add_item",
    "Add an item to a shopping list.",
);

pub const LIST_GET: ToolSpec = ToolSpec::new(
    "shopping_list_get",
    "Get a shopping list with its items in the order they were added. Completed items are hidden unless include_completed is set.",
);

pub const LIST_COMPLETE_ITEM: ToolSpec = ToolSpec::new(
    "shopping_list_complete_item",
    "Mark a shopping list item as bought (or not bought with completed=false).",
);

pub const LIST_DELETE: ToolSpec = ToolSpec::new(
    "shopping_list_delete",
    "Delete a shopping list and all its items. Requires confirm=true.",
);

fn default_quantity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Parameters for `shopping_list_create`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateListParams {
    /// Name of the shopping list.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Preferred store for this list.
    pub store_preference: Option<String>,
}

/// Parameters for `shopping_list_add_item`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddItemParams {
    /// ID of the shopping list.
    pub list_id: u64,

    /// Name of the item to add.
    pub item_name: String,

    /// Quantity needed.
    #[serde(default = "default_quantity")]
    pub quantity: f64,

    /// Item category.
    pub category: Option<String>,

    /// Additional notes.
    pub notes: Option<String>,
}

/// Parameters for `shopping_list_get`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetListParams {
    /// ID of the shopping list.
    pub list_id: u64,

    /// Include items already marked as completed.
    #[serde(default)]
    pub include_completed: bool,
}

/// Parameters for `shopping_list_complete_item`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompleteItemParams {
    /// ID of the item.
    pub item_id: u64,

    /// New completion state.
    #[serde(default = "default_true")]
    pub completed: bool,
}

/// Parameters for `shopping_list_delete`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteListParams {
    /// ID of the shopping list.
    pub list_id: u64,

    /// Must be true to delete.
    #[serde(default)]
    pub confirm: bool,
}

/// A list with its items.
#[derive(Debug, Serialize)]
struct ListView {
    #[serde(flatten)]
    list: ShoppingList,
    items: Vec<ShoppingItem>,
    total_items: usize,
    completed_items: usize,
}

impl ShoppingManager {
    pub async fn shopping_list_create(self: Arc<Self>, params: CreateListParams) -> ToolResult {
        let list = self
            .lists
            .create(ShoppingList {
                id: 0,
                name: params.name,
                description: params.description,
                store_preference: params.store_preference,
                created_at: self.clock.utc(),
            })
            .await?;

        info!("Created shopping list: {}", list.name);
        Ok(json!({
            "success": true,
            "shopping_list": ListView {
                list: list.clone(),
                items: Vec::new(),
                total_items: 0,
                completed_items: 0,
            },
            "message": format!("Shopping list '{}' created", list.name),
        }))
    }

    pub async fn shopping_list_add_item(self: Arc<Self>, params: AddItemParams) -> ToolResult {
        // Not atomic with shopping_list_delete: a concurrent delete can leave
        // an orphaned item.
        let list = self.lists.find(params.list_id).await?;

        let item = self
            .items
            .create(ShoppingItem {
                id: 0,
                list_id: list.id,
                name: params.item_name,
                quantity: params.quantity,
                category: params.category,
                notes: params.notes,
                completed: false,
                added_at: self.clock.utc(),
            })
            .await?;

        info!("Added item {} to shopping list {}", item.name, list.id);
        Ok(json!({
            "success": true,
            "item": item,
            "message": format!("Added '{}' to '{}'", item.name, list.name),
        }))
    }

    pub async fn shopping_list_get(self: Arc<Self>, params: GetListParams) -> ToolResult {
        let list = self.lists.find(params.list_id).await?;

        let all_items = self
            .items
            .query(Query::new().filter(|i: &ShoppingItem| i.list_id == list.id))
            .await;
        let total_items = all_items.len();
        let completed_items = all_items.iter().filter(|i| i.completed).count();

        let items = if params.include_completed {
            all_items
        } else {
            all_items.into_iter().filter(|i| !i.completed).collect()
        };

        info!("Retrieved shopping list {} with {} items", list.id, items.len());
        Ok(serde_json::to_value(ListView {
            list,
            items,
            total_items,
            completed_items,
        })?)
    }

    pub async fn shopping_list_complete_item(self: Arc<Self>, params: CompleteItemParams) -> ToolResult {
        let item = self
            .items
            .update(
                params.item_id,
                ShoppingItemUpdate {
                    completed: Some(params.completed),
                },
            )
            .await?;

        let state = if item.completed { "completed" } else { "not completed" };
        info!("Shopping item {} marked {}", item.id, state);
        Ok(json!({
            "success": true,
            "item": item,
            "message": format!("'{}' marked {}", item.name, state),
        }))
    }

    pub async fn shopping_list_delete(self: Arc<Self>, params: DeleteListParams) -> ToolResult {
        let list = self.lists.delete(params.list_id, params.confirm).await?;
        let removed = self
            .items
            .remove_where(|i: &ShoppingItem| i.list_id == list.id)
            .await?;

        info!("Deleted {} {} with {} items", ShoppingList::KIND, list.id, removed.len());
        Ok(json!({
            "success": true,
            "shopping_list": list,
            "removed_items": removed.len(),
            "message": format!("Shopping list '{}' deleted", list.name),
        }))
    }
}
