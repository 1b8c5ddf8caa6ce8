//! Expense records.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::require_text;
use crate::core::store::{Entity, StoreError, StoreResult};

/// A single spending entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    pub store: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mutable expense fields. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ExpenseUpdate {
    /// New amount in EUR.
    pub amount: Option<f64>,

    /// New description.
    pub description: Option<String>,

    /// New category.
    pub category: Option<String>,

    /// New date (YYYY-MM-DD).
    #[schemars(with = "Option<String>")]
    pub date: Option<NaiveDate>,

    /// New store name.
    pub store: Option<String>,

    /// New payment method.
    pub payment_method: Option<String>,
}

impl Entity for Expense {
    const KIND: &'static str = "Expense";
    const TABLE: &'static str = "expenses";
    type Update = ExpenseUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, update: ExpenseUpdate) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(store) = update.store {
            self.store = Some(store);
        }
        if let Some(payment_method) = update.payment_method {
            self.payment_method = Some(payment_method);
        }
    }

    fn validate(&self) -> StoreResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(StoreError::validation(format!(
                "Expense amount must be a positive number, got {}",
                self.amount
            )));
        }
        require_text("description", &self.description)?;
        require_text("category", &self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groceries() -> Expense {
        Expense {
            id: 1,
            amount: 42.5,
            description: "Groceries".into(),
            category: "Food".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            store: None,
            payment_method: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        for amount in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let expense = Expense { amount, ..groceries() };
            assert!(expense.validate().is_err(), "amount {} accepted", amount);
        }
        assert!(groceries().validate().is_ok());
    }

    #[test]
    fn test_update_ignores_unknown_fields() {
        let update: ExpenseUpdate =
            serde_json::from_value(serde_json::json!({ "amount": 10.0, "id": 99 })).unwrap();
        let mut expense = groceries();
        expense.apply(update);
        assert_eq!(expense.amount, 10.0);
        assert_eq!(expense.id, 1);
    }
}
