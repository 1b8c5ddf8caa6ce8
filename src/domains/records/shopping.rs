//! Shopping lists and their items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use super::require_text;
use crate::core::store::{Entity, StoreError, StoreResult};

/// A named shopping list. Items live in their own store and reference the
/// list by `list_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub store_preference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ShoppingList {
    const KIND: &'static str = "Shopping list";
    const TABLE: &'static str = "shopping_lists";
    type Update = Infallible;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, update: Infallible) {
        match update {}
    }

    fn validate(&self) -> StoreResult<()> {
        require_text("name", &self.name)
    }
}

/// One line on a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: u64,
    pub list_id: u64,
    pub name: String,
    pub quantity: f64,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub completed: bool,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ShoppingItemUpdate {
    pub completed: Option<bool>,
}

impl Entity for ShoppingItem {
    const KIND: &'static str = "Shopping item";
    const TABLE: &'static str = "shopping_items";
    type Update = ShoppingItemUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, update: ShoppingItemUpdate) {
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
    }

    fn validate(&self) -> StoreResult<()> {
        require_text("item_name", &self.name)?;
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(StoreError::validation(format!(
                "quantity must be zero or more, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}
