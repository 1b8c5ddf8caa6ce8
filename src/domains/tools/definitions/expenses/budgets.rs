//! Budgets and budget status.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::ExpensesManager;
use crate::core::clock::today;
use crate::core::store::query::{text_eq, within};
use crate::core::store::Query;
use crate::domains::records::{Budget, BudgetPeriod, BudgetUpdate, Expense};
use crate::domains::tools::{ToolResult, ToolSpec, round1, round2};

pub const SET_BUDGET: ToolSpec = ToolSpec::new(
    "set_budget",
    "Set the budget for a category and period. Setting it again replaces the amount and alert threshold.",
);

pub const BUDGET_STATUS: ToolSpec = ToolSpec::new(
    "get_budget_status",
    "Get spending against each budget for the current week, month or year, with alerts.",
);

fn default_threshold() -> f64 {
    80.0
}

/// Parameters for `set_budget`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetBudgetParams {
    /// Budget category.
    pub category: String,

    /// Budget amount in EUR.
    pub amount: f64,

    /// Budget period.
    #[serde(default)]
    pub period: BudgetPeriod,

    /// Warn when spending reaches this percentage.
    #[serde(default = "default_threshold")]
    pub alert_threshold: f64,
}

/// Parameters for `get_budget_status`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BudgetStatusParams {
    /// Category filter (case-insensitive).
    pub category: Option<String>,

    /// Period filter.
    pub period: Option<BudgetPeriod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum AlertLevel {
    Warning,
    Danger,
}

#[derive(Debug, Serialize)]
struct BudgetAlert {
    level: AlertLevel,
    message: String,
}

#[derive(Debug, Serialize)]
struct BudgetStatus {
    #[serde(flatten)]
    budget: Budget,
    period_start: NaiveDate,
    spent_this_period: f64,
    remaining: f64,
    percentage_used: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<BudgetAlert>,
}

impl BudgetStatus {
    fn compute(budget: Budget, expenses: &[Expense], today: NaiveDate) -> Self {
        let period_start = budget.period.start(today);
        let spent: f64 = expenses
            .iter()
            .filter(|e| text_eq(&e.category, &budget.category))
            .filter(|e| within(e.date, Some(period_start), Some(today)))
            .map(|e| e.amount)
            .sum();
        let percentage_used = round1(spent / budget.amount * 100.0);

        let alert = (percentage_used >= budget.alert_threshold).then(|| BudgetAlert {
            level: if percentage_used >= 100.0 {
                AlertLevel::Danger
            } else {
                AlertLevel::Warning
            },
            message: format!("Budget {:.1}% used", percentage_used),
        });

        Self {
            period_start,
            spent_this_period: round2(spent),
            remaining: round2(budget.amount - spent),
            percentage_used,
            alert,
            budget,
        }
    }
}

impl ExpensesManager {
    pub async fn set_budget(self: Arc<Self>, params: SetBudgetParams) -> ToolResult {
        let key = Budget::key_for(&params.category, params.period);
        let now = self.clock.utc();

        let _guard = self.budget_writes.lock().await;
        let existing = self
            .budgets
            .query(Query::new().filter(|b: &Budget| b.key == key).limit(1))
            .await;

        let (budget, created) = match existing.first() {
            Some(current) => {
                let budget = self
                    .budgets
                    .update(
                        current.id,
                        BudgetUpdate {
                            amount: Some(params.amount),
                            alert_threshold: Some(params.alert_threshold),
                            updated_at: Some(now),
                        },
                    )
                    .await?;
                (budget, false)
            }
            None => {
                let budget = self
                    .budgets
                    .create(Budget {
                        id: 0,
                        key,
                        category: params.category.trim().to_string(),
                        amount: params.amount,
                        period: params.period,
                        alert_threshold: params.alert_threshold,
                        created_at: now,
                        updated_at: now,
                    })
                    .await?;
                (budget, true)
            }
        };

        info!(
            "Set {} budget of €{:.2} for category {}",
            budget.period.as_str(),
            budget.amount,
            budget.category
        );
        Ok(json!({
            "success": true,
            "created": created,
            "budget": budget,
            "message": format!(
                "Budget of €{:.2} set for {} ({})",
                budget.amount,
                budget.category,
                budget.period.as_str()
            ),
        }))
    }

    pub async fn get_budget_status(self: Arc<Self>, params: BudgetStatusParams) -> ToolResult {
        let today = today(self.clock.as_ref());
        let budgets = self
            .budgets
            .query(
                Query::new()
                    .filter_opt(params.category, |b: &Budget, c| text_eq(&b.category, c))
                    .filter_opt(params.period, |b: &Budget, p| b.period == *p),
            )
            .await;
        let expenses = self.expenses.all().await;

        let statuses: Vec<_> = budgets
            .into_iter()
            .map(|budget| BudgetStatus::compute(budget, &expenses, today))
            .collect();

        let alerts = statuses.iter().filter(|s| s.alert.is_some()).count();
        if alerts > 0 {
            warn!("{} budgets over their alert threshold", alerts);
        }

        let summary = json!({
            "total_budgets": statuses.len(),
            "alerts": alerts,
            "total_allocated": round2(statuses.iter().map(|s| s.budget.amount).sum()),
            "total_spent": round2(statuses.iter().map(|s| s.spent_this_period).sum()),
            "total_remaining": round2(statuses.iter().map(|s| s.remaining).sum()),
        });

        info!("Retrieved budget status for {} budgets", statuses.len());
        Ok(json!({
            "as_of": today,
            "budgets": statuses,
            "summary": summary,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, manager, spend};
    use super::*;

    fn food_budget(amount: f64) -> SetBudgetParams {
        SetBudgetParams {
            category: "Food".into(),
            amount,
            period: BudgetPeriod::Monthly,
            alert_threshold: 80.0,
        }
    }

    fn status_for(category: &str) -> BudgetStatusParams {
        BudgetStatusParams {
            category: Some(category.into()),
            period: None,
        }
    }

    #[tokio::test]
    async fn test_set_then_status_returns_one_budget() {
        let m = manager();
        m.clone().set_budget(food_budget(200.0)).await.unwrap();

        let status = m.clone().get_budget_status(status_for("Food")).await.unwrap();
        let budgets = status["budgets"].as_array().unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0]["amount"], 200.0);
        assert_eq!(budgets[0]["spent_this_period"], 0.0);
        assert!(budgets[0].get("alert").is_none());
    }

    #[tokio::test]
    async fn test_set_budget_upserts_per_category_and_period() {
        let m = manager();
        let first = m.clone().set_budget(food_budget(200.0)).await.unwrap();
        assert_eq!(first["created"], true);

        let second = m
            .clone()
            .set_budget(SetBudgetParams {
                category: "FOOD".into(),
                ..food_budget(250.0)
            })
            .await
            .unwrap();
        assert_eq!(second["created"], false);
        assert_eq!(second["budget"]["amount"], 250.0);
        assert_eq!(second["budget"]["category"], "Food");
        assert_eq!(m.budgets.len().await, 1);

        m.clone()
            .set_budget(SetBudgetParams {
                period: BudgetPeriod::Weekly,
                ..food_budget(60.0)
            })
            .await
            .unwrap();
        assert_eq!(m.budgets.len().await, 2);
    }

    #[tokio::test]
    async fn test_invalid_threshold_is_rejected() {
        let result = manager()
            .set_budget(SetBudgetParams {
                alert_threshold: 150.0,
                ..food_budget(200.0)
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_spending_counts_only_the_current_period() {
        let m = manager();
        m.clone().set_budget(food_budget(100.0)).await.unwrap();
        spend(&m, 50.0, "Food", date(2025, 1, 2)).await;
        spend(&m, 35.0, "food", date(2025, 1, 14)).await;
        // previous month and other categories don't count
        spend(&m, 80.0, "Food", date(2024, 12, 31)).await;
        spend(&m, 20.0, "Transport", date(2025, 1, 3)).await;

        let status = m.clone().get_budget_status(status_for("food")).await.unwrap();
        let budget = &status["budgets"][0];
        assert_eq!(budget["period_start"], "2025-01-01");
        assert_eq!(budget["spent_this_period"], 85.0);
        assert_eq!(budget["remaining"], 15.0);
        assert_eq!(budget["percentage_used"], 85.0);
        assert_eq!(budget["alert"]["level"], "warning");
        assert_eq!(status["summary"]["alerts"], 1);
    }

    #[tokio::test]
    async fn test_weekly_budget_starts_on_monday() {
        let m = manager();
        m.clone()
            .set_budget(SetBudgetParams {
                period: BudgetPeriod::Weekly,
                ..food_budget(40.0)
            })
            .await
            .unwrap();
        // Sunday before the current week
        spend(&m, 30.0, "Food", date(2025, 1, 12)).await;
        spend(&m, 45.0, "Food", date(2025, 1, 13)).await;

        let status = m.clone().get_budget_status(BudgetStatusParams::default()).await.unwrap();
        let budget = &status["budgets"][0];
        assert_eq!(budget["period_start"], "2025-01-13");
        assert_eq!(budget["spent_this_period"], 45.0);
        assert_eq!(budget["remaining"], -5.0);
        assert_eq!(budget["alert"]["level"], "danger");
    }
}
