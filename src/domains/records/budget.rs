//! Spending budgets, one per (category, period).

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::require_text;
use crate::core::store::{Entity, StoreError, StoreResult};

/// Budget period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// First day of the calendar period containing `today`.
    ///
    /// Weeks start on Monday.
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Weekly => {
                today - chrono::Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            Self::Monthly => today.with_day(1).unwrap_or(today),
            Self::Yearly => today.with_ordinal(1).unwrap_or(today),
        }
    }
}

/// A spending limit for one category over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: u64,
    /// Composite identity, e.g. `food:monthly`.
    pub key: String,
    pub category: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    /// Percentage of the budget at which a warning is raised.
    pub alert_threshold: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Composite key for a category/period pair. Categories compare
    /// case-insensitively.
    pub fn key_for(category: &str, period: BudgetPeriod) -> String {
        format!("{}:{}", category.trim().to_lowercase(), period.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub amount: Option<f64>,
    pub alert_threshold: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Budget {
    const KIND: &'static str = "Budget";
    const TABLE: &'static str = "budgets";
    type Update = BudgetUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, update: BudgetUpdate) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(threshold) = update.alert_threshold {
            self.alert_threshold = threshold;
        }
        if let Some(updated_at) = update.updated_at {
            self.updated_at = updated_at;
        }
    }

    fn validate(&self) -> StoreResult<()> {
        require_text("category", &self.category)?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(StoreError::validation(format!(
                "Budget amount must be a positive number, got {}",
                self.amount
            )));
        }
        if !(0.0..=100.0).contains(&self.alert_threshold) {
            return Err(StoreError::validation(format!(
                "alert_threshold must be between 0 and 100, got {}",
                self.alert_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_starts() {
        // 2025-01-15 is a Wednesday
        let today = date(2025, 1, 15);
        assert_eq!(BudgetPeriod::Weekly.start(today), date(2025, 1, 13));
        assert_eq!(BudgetPeriod::Monthly.start(today), date(2025, 1, 1));
        assert_eq!(BudgetPeriod::Yearly.start(date(2025, 6, 30)), date(2025, 1, 1));
    }

    #[test]
    fn test_key_is_case_insensitive() {
        assert_eq!(
            Budget::key_for("Food", BudgetPeriod::Monthly),
            Budget::key_for(" food ", BudgetPeriod::Monthly)
        );
        assert_ne!(
            Budget::key_for("Food", BudgetPeriod::Monthly),
            Budget::key_for("Food", BudgetPeriod::Weekly)
        );
    }

    #[test]
    fn test_threshold_range() {
        let now = Utc::now();
        let budget = Budget {
            id: 1,
            key: Budget::key_for("Food", BudgetPeriod::Monthly),
            category: "Food".into(),
            amount: 200.0,
            period: BudgetPeriod::Monthly,
            alert_threshold: 120.0,
            created_at: now,
            updated_at: now,
        };
        assert!(budget.validate().is_err());
        assert!(Budget { alert_threshold: 80.0, ..budget }.validate().is_ok());
    }
}
