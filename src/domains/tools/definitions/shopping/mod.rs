//! Shopping manager portmanteau.
//!
//! - `offers.rs` - store offers, price comparison, nearby stores, coupons
//!   (static Vienna supermarket catalogue)
//! - `lists.rs` - shopping lists and their items (entity stores)
//! - `history.rs` - spending per store and category, from recorded expenses

mod history;
mod lists;
mod offers;

pub use lists::{
    AddItemParams, CompleteItemParams, CreateListParams, DeleteListParams, GetListParams,
};
pub use history::ShoppingHistoryParams;
pub use offers::{CompareParams, CouponParams, NearbyParams, OffersParams};

use std::sync::Arc;

use crate::core::clock::SharedClock;
use crate::core::store::EntityStore;
use crate::domains::records::{Database, Expense, ShoppingItem, ShoppingList};
use crate::domains::tools::{Portmanteau, ToolError, ToolRegistry};

pub static SHOPPING: Portmanteau = Portmanteau {
    name: "shopping_manager",
    description: "Store offers, price comparisons, nearby stores, coupons, shopping lists and shopping history",
    categories: &["offers", "price_comparison", "stores", "coupons", "shopping_lists", "history"],
};

/// Handlers for the shopping tools.
pub struct ShoppingManager {
    lists: Arc<EntityStore<ShoppingList>>,
    items: Arc<EntityStore<ShoppingItem>>,
    expenses: Arc<EntityStore<Expense>>,
    clock: SharedClock,
}

impl ShoppingManager {
    pub fn new(db: &Database, clock: SharedClock) -> Self {
        Self {
            lists: db.shopping_lists.clone(),
            items: db.shopping_items.clone(),
            expenses: db.expenses.clone(),
            clock,
        }
    }
}

/// Register every shopping tool.
pub fn register_shopping_tools(registry: &mut ToolRegistry, manager: Arc<ShoppingManager>) -> Result<(), ToolError> {
    registry
        .portmanteau(&SHOPPING)
        .register(offers::GET_STORE_OFFERS, manager.clone(), ShoppingManager::get_store_offers)?
        .register(offers::COMPARE_PRICES, manager.clone(), ShoppingManager::compare_prices)?
        .register(offers::FIND_STORES_NEARBY, manager.clone(), ShoppingManager::find_stores_nearby)?
        .register(offers::FIND_COUPONS, manager.clone(), ShoppingManager::find_coupons)?
        .register(lists::LIST_CREATE, manager.clone(), ShoppingManager::shopping_list_create)?
        .register(lists::LIST_ADD_ITEM, manager.clone(), ShoppingManager::shopping_list_add_item)?
        .register(lists::LIST_GET, manager.clone(), ShoppingManager::shopping_list_get)?
        .register(lists::LIST_COMPLETE_ITEM, manager.clone(), ShoppingManager::shopping_list_complete_item)?
        .register(lists::LIST_DELETE, manager.clone(), ShoppingManager::shopping_list_delete)?
        .register(history::SHOPPING_HISTORY, manager, ShoppingManager::get_shopping_history)?;
    Ok(())
}
