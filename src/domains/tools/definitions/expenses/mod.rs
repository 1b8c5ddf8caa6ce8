//! Expenses manager portmanteau.
//!
//! - `records.rs` - add, update, delete and date-range listing
//! - `reports.rs` - category totals and top spending categories
//! - `budgets.rs` - budgets and their status against actual spending
//! - `transfer.rs` - JSON/CSV export and import

mod budgets;
mod records;
mod reports;
mod transfer;

pub use budgets::{BudgetStatusParams, SetBudgetParams};
pub use records::{AddExpenseParams, DateRangeParams, DeleteExpenseParams, UpdateExpenseParams};
pub use reports::{CategoryParams, SpendingWindow, TopCategoriesParams};
pub use transfer::{ExportFormat, ExportParams, ImportParams};

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::clock::SharedClock;
use crate::core::store::EntityStore;
use crate::domains::records::{Budget, Database, Expense};
use crate::domains::tools::{Portmanteau, ToolError, ToolRegistry};

pub static EXPENSES: Portmanteau = Portmanteau {
    name: "expenses_manager",
    description: "Expense tracking, category reports, budgets and expense import/export",
    categories: &["expenses", "reports", "budgets", "export"],
};

/// Handlers for the expense tools.
pub struct ExpensesManager {
    expenses: Arc<EntityStore<Expense>>,
    budgets: Arc<EntityStore<Budget>>,
    /// Serializes the find-then-write of a budget upsert.
    budget_writes: Mutex<()>,
    clock: SharedClock,
}

impl ExpensesManager {
    pub fn new(db: &Database, clock: SharedClock) -> Self {
        Self {
            expenses: db.expenses.clone(),
            budgets: db.budgets.clone(),
            budget_writes: Mutex::new(()),
            clock,
        }
    }
}

/// Register every expense tool.
pub fn register_expenses_tools(registry: &mut ToolRegistry, manager: Arc<ExpensesManager>) -> Result<(), ToolError> {
    registry
        .portmanteau(&EXPENSES)
        .register(records::ADD_EXPENSE, manager.clone(), ExpensesManager::add_expense)?
        .register(records::UPDATE_EXPENSE, manager.clone(), ExpensesManager::update_expense)?
        .register(records::DELETE_EXPENSE, manager.clone(), ExpensesManager::delete_expense)?
        .register(reports::BY_CATEGORY, manager.clone(), ExpensesManager::get_expenses_by_category)?
        .register(records::BY_DATE_RANGE, manager.clone(), ExpensesManager::get_expenses_by_date_range)?
        .register(reports::TOP_CATEGORIES, manager.clone(), ExpensesManager::get_top_spending_categories)?
        .register(budgets::SET_BUDGET, manager.clone(), ExpensesManager::set_budget)?
        .register(budgets::BUDGET_STATUS, manager.clone(), ExpensesManager::get_budget_status)?
        .register(transfer::EXPORT, manager.clone(), ExpensesManager::export_expenses)?
        .register(transfer::IMPORT, manager, ExpensesManager::import_expenses)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::NaiveDate;

    /// Manager pinned to Wednesday 2025-01-15.
    pub fn manager() -> Arc<ExpensesManager> {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()).shared();
        Arc::new(ExpensesManager::new(&Database::in_memory(), clock))
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub async fn spend(m: &Arc<ExpensesManager>, amount: f64, category: &str, on: NaiveDate) -> u64 {
        let added = m
            .clone()
            .add_expense(records::AddExpenseParams {
                amount,
                description: format!("{} purchase", category),
                category: category.to_string(),
                date: Some(on),
                store: None,
                payment_method: None,
            })
            .await
            .unwrap();
        added["expense"]["id"].as_u64().unwrap()
    }
}
