//! Expense entry, correction and removal.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::ExpensesManager;
use crate::core::clock::today;
use crate::core::store::query::{text_eq, within};
use crate::core::store::Query;
use crate::domains::records::{Expense, ExpenseUpdate};
use crate::domains::tools::{ToolResult, ToolSpec, round2};

pub const ADD_EXPENSE: ToolSpec = ToolSpec::new(
    "add_expense",
    "Add a new expense entry. Amount in EUR; date defaults to today.",
);

pub const UPDATE_EXPENSE: ToolSpec = ToolSpec::new(
    "update_expense",
    "Update fields of an existing expense. Only amount, description, category, date, store and payment_method can change.",
);

pub const DELETE_EXPENSE: ToolSpec = ToolSpec::new(
    "delete_expense",
    "Delete an expense entry. Requires confirm=true.",
);

pub const BY_DATE_RANGE: ToolSpec = ToolSpec::new(
    "get_expenses_by_date_range",
    "Get expenses within an inclusive date range, newest first, with optional category and amount filters.",
);

/// Parameters for `add_expense`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddExpenseParams {
    /// Expense amount in EUR.
    pub amount: f64,

    /// Description of the expense.
    pub description: String,

    /// Expense category, e.g. "Food" or "Transport".
    pub category: String,

    /// Expense date (YYYY-MM-DD). Defaults to today.
    #[schemars(with = "Option<String>")]
    pub date: Option<NaiveDate>,

    /// Store or business name.
    pub store: Option<String>,

    /// Payment method.
    pub payment_method: Option<String>,
}

/// Parameters for `update_expense`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateExpenseParams {
    /// ID of the expense to update.
    pub expense_id: u64,

    /// Fields to change.
    pub updates: ExpenseUpdate,
}

/// Parameters for `delete_expense`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteExpenseParams {
    /// ID of the expense to delete.
    pub expense_id: u64,

    /// Must be true to delete.
    #[serde(default)]
    pub confirm: bool,
}

/// Parameters for `get_expenses_by_date_range`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DateRangeParams {
    /// Start date (YYYY-MM-DD), inclusive.
    #[schemars(with = "String")]
    pub date_from: NaiveDate,

    /// End date (YYYY-MM-DD), inclusive.
    #[schemars(with = "String")]
    pub date_to: NaiveDate,

    /// Category filter (case-insensitive).
    pub category: Option<String>,

    /// Minimum amount, inclusive.
    pub min_amount: Option<f64>,

    /// Maximum amount, inclusive.
    pub max_amount: Option<f64>,
}

impl ExpensesManager {
    pub async fn add_expense(self: Arc<Self>, params: AddExpenseParams) -> ToolResult {
        let expense = self
            .expenses
            .create(Expense {
                id: 0,
                amount: params.amount,
                description: params.description,
                category: params.category,
                date: params.date.unwrap_or_else(|| today(self.clock.as_ref())),
                store: params.store,
                payment_method: params.payment_method,
                created_at: self.clock.utc(),
            })
            .await?;

        info!(
            "Added expense: €{:.2} for {} in category {}",
            expense.amount, expense.description, expense.category
        );
        Ok(json!({
            "success": true,
            "expense": expense,
            "message": format!("Expense of €{:.2} added successfully", expense.amount),
        }))
    }

    pub async fn update_expense(self: Arc<Self>, params: UpdateExpenseParams) -> ToolResult {
        let expense = self.expenses.update(params.expense_id, params.updates).await?;

        info!("Updated expense {}", expense.id);
        Ok(json!({
            "success": true,
            "expense": expense,
            "message": format!("Expense {} updated successfully", expense.id),
        }))
    }

    pub async fn delete_expense(self: Arc<Self>, params: DeleteExpenseParams) -> ToolResult {
        let expense = self.expenses.delete(params.expense_id, params.confirm).await?;

        info!(
            "Deleted expense {}: €{:.2} for {}",
            expense.id, expense.amount, expense.description
        );
        Ok(json!({
            "success": true,
            "message": format!("Expense {} deleted successfully", expense.id),
            "deleted_expense": {
                "id": expense.id,
                "amount": expense.amount,
                "description": expense.description,
            },
        }))
    }

    pub async fn get_expenses_by_date_range(self: Arc<Self>, params: DateRangeParams) -> ToolResult {
        let (from, to) = (params.date_from, params.date_to);
        let expenses = self
            .expenses
            .query(
                Query::new()
                    .filter(move |e: &Expense| within(e.date, Some(from), Some(to)))
                    .filter_opt(params.category, |e: &Expense, c| text_eq(&e.category, c))
                    .filter_opt(params.min_amount, |e: &Expense, min| e.amount >= *min)
                    .filter_opt(params.max_amount, |e: &Expense, max| e.amount <= *max)
                    .order_by(|a: &Expense, b: &Expense| b.date.cmp(&a.date)),
            )
            .await;

        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        let average = if expenses.is_empty() {
            0.0
        } else {
            total / expenses.len() as f64
        };

        info!("Retrieved {} expenses from {} to {}", expenses.len(), from, to);
        Ok(json!({
            "period": { "from": from, "to": to },
            "count": expenses.len(),
            "total_amount": round2(total),
            "average_amount": round2(average),
            "expenses": expenses,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, manager, spend};
    use super::*;
    use crate::domains::tools::DomainError;

    fn range(from: NaiveDate, to: NaiveDate) -> DateRangeParams {
        DateRangeParams {
            date_from: from,
            date_to: to,
            category: None,
            min_amount: None,
            max_amount: None,
        }
    }

    #[tokio::test]
    async fn test_add_then_find_returns_same_fields() {
        let m = manager();
        let added = m
            .clone()
            .add_expense(AddExpenseParams {
                amount: 42.5,
                description: "Groceries".into(),
                category: "Food".into(),
                date: Some(date(2025, 1, 10)),
                store: Some("Billa".into()),
                payment_method: None,
            })
            .await
            .unwrap();
        assert_eq!(added["success"], true);

        let id = added["expense"]["id"].as_u64().unwrap();
        let stored = m.expenses.find(id).await.unwrap();
        assert_eq!(stored.amount, 42.5);
        assert_eq!(stored.description, "Groceries");
        assert_eq!(stored.store.as_deref(), Some("Billa"));
        assert_eq!(stored.date, date(2025, 1, 10));
    }

    #[tokio::test]
    async fn test_date_defaults_to_today() {
        let m = manager();
        let added = m
            .clone()
            .add_expense(AddExpenseParams {
                amount: 3.2,
                description: "Melange".into(),
                category: "Coffee".into(),
                date: None,
                store: None,
                payment_method: None,
            })
            .await
            .unwrap();
        assert_eq!(added["expense"]["date"], "2025-01-15");
    }

    #[tokio::test]
    async fn test_non_positive_amounts_are_rejected() {
        let result = manager()
            .add_expense(AddExpenseParams {
                amount: 0.0,
                description: "Nothing".into(),
                category: "Food".into(),
                date: None,
                store: None,
                payment_method: None,
            })
            .await;
        assert!(matches!(result, Err(DomainError::Store(_))));
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let m = manager();
        let id = spend(&m, 10.0, "Food", date(2025, 1, 10)).await;

        let updated = m
            .clone()
            .update_expense(UpdateExpenseParams {
                expense_id: id,
                updates: ExpenseUpdate {
                    amount: Some(12.0),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(updated["expense"]["amount"], 12.0);
        assert_eq!(updated["expense"]["category"], "Food");

        let missing = m
            .clone()
            .update_expense(UpdateExpenseParams {
                expense_id: 99,
                updates: ExpenseUpdate::default(),
            })
            .await;
        assert_eq!(missing.unwrap_err().to_string(), "Expense 99 not found");
    }

    #[tokio::test]
    async fn test_delete_without_confirmation_leaves_store_unchanged() {
        let m = manager();
        let id = spend(&m, 10.0, "Food", date(2025, 1, 10)).await;

        let refused = m
            .clone()
            .delete_expense(DeleteExpenseParams {
                expense_id: id,
                confirm: false,
            })
            .await;
        assert!(refused.is_err());
        assert_eq!(m.expenses.len().await, 1);

        let deleted = m
            .clone()
            .delete_expense(DeleteExpenseParams {
                expense_id: id,
                confirm: true,
            })
            .await
            .unwrap();
        assert_eq!(deleted["deleted_expense"]["amount"], 10.0);
        assert!(m.expenses.is_empty().await);
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive_and_newest_first() {
        let m = manager();
        spend(&m, 5.0, "Food", date(2025, 1, 1)).await;
        spend(&m, 15.0, "Transport", date(2025, 1, 5)).await;
        spend(&m, 25.0, "Food", date(2025, 1, 9)).await;
        spend(&m, 99.0, "Food", date(2025, 1, 10)).await;

        let found = m
            .clone()
            .get_expenses_by_date_range(range(date(2025, 1, 1), date(2025, 1, 9)))
            .await
            .unwrap();
        assert_eq!(found["count"], 3);
        assert_eq!(found["total_amount"], 45.0);
        assert_eq!(found["average_amount"], 15.0);
        assert_eq!(found["expenses"][0]["date"], "2025-01-09");
        assert_eq!(found["expenses"][2]["date"], "2025-01-01");

        let food = m
            .clone()
            .get_expenses_by_date_range(DateRangeParams {
                category: Some("food".into()),
                min_amount: Some(10.0),
                ..range(date(2025, 1, 1), date(2025, 1, 31))
            })
            .await
            .unwrap();
        assert_eq!(food["count"], 2);
    }

    #[tokio::test]
    async fn test_empty_range_averages_zero() {
        let found = manager()
            .get_expenses_by_date_range(range(date(2024, 1, 1), date(2024, 1, 31)))
            .await
            .unwrap();
        assert_eq!(found["count"], 0);
        assert_eq!(found["average_amount"], 0.0);
    }
}
