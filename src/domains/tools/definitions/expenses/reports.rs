//! Spending reports grouped by category.

use chrono::{Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::ExpensesManager;
use crate::core::clock::today;
use crate::core::store::query::{text_eq, within};
use crate::core::store::Query;
use crate::domains::records::Expense;
use crate::domains::tools::{ToolResult, ToolSpec, round1, round2};

pub const BY_CATEGORY: ToolSpec = ToolSpec::new(
    "get_expenses_by_category",
    "Get expenses grouped by category, highest total first, with optional category and date filters.",
);

pub const TOP_CATEGORIES: ToolSpec = ToolSpec::new(
    "get_top_spending_categories",
    "Get the highest spending categories over the last week, month, quarter or year.",
);

fn default_top_limit() -> usize {
    5
}

/// Look-back window ending today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SpendingWindow {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl SpendingWindow {
    pub fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }
}

/// Parameters for `get_expenses_by_category`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CategoryParams {
    /// Only this category (case-insensitive).
    pub category: Option<String>,

    /// Start date (YYYY-MM-DD), inclusive.
    #[schemars(with = "Option<String>")]
    pub date_from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), inclusive.
    #[schemars(with = "Option<String>")]
    pub date_to: Option<NaiveDate>,
}

/// Parameters for `get_top_spending_categories`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TopCategoriesParams {
    /// Look-back window.
    #[serde(default)]
    pub period: SpendingWindow,

    /// Maximum categories to return.
    #[serde(default = "default_top_limit")]
    pub limit: usize,
}

/// Expenses of one category.
#[derive(Debug, Clone, Serialize)]
pub(super) struct CategoryGroup {
    pub category: String,
    pub count: usize,
    pub total: f64,
    #[serde(skip)]
    pub expenses: Vec<Expense>,
}

/// Group expenses by category, ignoring case. A group is named after the
/// first spelling seen. Groups are ordered by total, highest first; equal
/// totals keep first-appearance order.
pub(super) fn group_by_category(expenses: &[Expense]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for expense in expenses {
        match groups.iter_mut().find(|g| text_eq(&g.category, &expense.category)) {
            Some(group) => {
                group.count += 1;
                group.total += expense.amount;
                group.expenses.push(expense.clone());
            }
            None => groups.push(CategoryGroup {
                category: expense.category.clone(),
                count: 1,
                total: expense.amount,
                expenses: vec![expense.clone()],
            }),
        }
    }

    for group in &mut groups {
        group.total = round2(group.total);
    }
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    groups
}

impl ExpensesManager {
    pub async fn get_expenses_by_category(self: Arc<Self>, params: CategoryParams) -> ToolResult {
        let (from, to) = (params.date_from, params.date_to);
        let expenses = self
            .expenses
            .query(
                Query::new()
                    .filter_opt(params.category, |e: &Expense, c| text_eq(&e.category, c))
                    .filter(move |e: &Expense| within(e.date, from, to)),
            )
            .await;

        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        let groups = group_by_category(&expenses);

        let categories: Vec<_> = groups
            .iter()
            .map(|g| {
                let entries: Vec<_> = g
                    .expenses
                    .iter()
                    .map(|e| {
                        json!({
                            "id": e.id,
                            "amount": e.amount,
                            "description": e.description,
                            "date": e.date,
                        })
                    })
                    .collect();
                json!({
                    "category": g.category,
                    "count": g.count,
                    "total": g.total,
                    "expenses": entries,
                })
            })
            .collect();

        info!(
            "Retrieved expenses by category: {} categories, €{:.2}",
            categories.len(),
            total
        );
        Ok(json!({
            "period": {
                "from": from.map_or_else(|| "all".to_string(), |d| d.to_string()),
                "to": to.map_or_else(|| "all".to_string(), |d| d.to_string()),
            },
            "total_expenses": expenses.len(),
            "total_amount": round2(total),
            "categories": categories,
            "top_category": groups.first().map(|g| g.category.clone()),
        }))
    }

    pub async fn get_top_spending_categories(self: Arc<Self>, params: TopCategoriesParams) -> ToolResult {
        let to = today(self.clock.as_ref());
        let from = to - Duration::days(params.period.days());

        let expenses = self
            .expenses
            .query(Query::new().filter(move |e: &Expense| within(e.date, Some(from), Some(to))))
            .await;
        let total: f64 = expenses.iter().map(|e| e.amount).sum();

        let categories: Vec<_> = group_by_category(&expenses)
            .into_iter()
            .take(params.limit)
            .map(|g| {
                let percentage = if total > 0.0 { g.total / total * 100.0 } else { 0.0 };
                json!({
                    "category": g.category,
                    "amount": g.total,
                    "percentage": round1(percentage),
                    "expense_count": g.count,
                })
            })
            .collect();

        info!(
            "Retrieved top {} spending categories for the last {} days",
            categories.len(),
            params.period.days()
        );
        Ok(json!({
            "period": params.period,
            "date_range": { "from": from, "to": to },
            "total_spent": round2(total),
            "categories": categories,
        }))
    }
}
