//! Entity records owned by the portmanteaus.
//!
//! Each record type implements [`Entity`](crate::core::store::Entity) and is
//! held in its own [`EntityStore`](crate::core::store::EntityStore) inside the
//! [`Database`] aggregate.

mod budget;
mod database;
mod expense;
mod planning;
mod playlist;
mod shopping;

pub use budget::{Budget, BudgetPeriod, BudgetUpdate};
pub use database::Database;
pub use expense::{Expense, ExpenseUpdate};
pub use planning::{
    Frequency, Goal, GoalStatus, Habit, HabitCompletion, HabitStatus, HabitUpdate, Priority,
    ProgressEntry, Todo, TodoStatus, TodoUpdate,
};
pub use playlist::Playlist;
pub use shopping::{ShoppingItem, ShoppingItemUpdate, ShoppingList};

use crate::core::store::{StoreError, StoreResult};

/// Reject empty or whitespace-only text fields.
fn require_text(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}
