//! Shopping history derived from recorded expenses.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::ShoppingManager;
use crate::core::clock::today;
use crate::core::store::Query;
use crate::core::store::query::{text_eq, within};
use crate::domains::records::Expense;
use crate::domains::tools::{DomainError, ToolResult, ToolSpec, round1, round2};

pub const SHOPPING_HISTORY: ToolSpec = ToolSpec::new(
    "get_shopping_history",
    "Get shopping totals by store and category from recorded expenses. Defaults to the start of last month through today.",
);

/// Entries kept in `top_stores` and `top_categories`.
const TOP_ENTRIES: usize = 5;

/// Parameters for `get_shopping_history`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ShoppingHistoryParams {
    /// Start date (YYYY-MM-DD), inclusive. Defaults to the first day of last month.
    #[schemars(with = "Option<String>")]
    pub date_from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), inclusive. Defaults to today.
    #[schemars(with = "Option<String>")]
    pub date_to: Option<NaiveDate>,

    /// Only purchases at this store (case-insensitive).
    pub store: Option<String>,

    /// Only this expense category (case-insensitive).
    pub category: Option<String>,
}

struct Tally {
    name: String,
    spent: f64,
    count: usize,
}

/// Sum `amount` per name, ignoring case, highest total first.
fn tally<'a>(entries: impl Iterator<Item = (&'a str, f64)>) -> Vec<Tally> {
    let mut tallies: Vec<Tally> = Vec::new();
    for (name, amount) in entries {
        match tallies.iter_mut().find(|t| text_eq(&t.name, name)) {
            Some(t) => {
                t.spent += amount;
                t.count += 1;
            }
            None => tallies.push(Tally {
                name: name.to_string(),
                spent: amount,
                count: 1,
            }),
        }
    }
    tallies.sort_by(|a, b| b.spent.total_cmp(&a.spent));
    tallies
}

fn busiest_weekday(expenses: &[Expense]) -> Option<Weekday> {
    let mut counts = [0usize; 7];
    for expense in expenses {
        counts[expense.date.weekday().num_days_from_monday() as usize] += 1;
    }
    // First maximum wins so Monday beats Sunday on a tie.
    let (index, &count) = counts
        .iter()
        .enumerate()
        .rev()
        .max_by_key(|(_, count)| **count)?;
    (count > 0).then(|| Weekday::try_from(index as u8).ok()).flatten()
}

impl ShoppingManager {
    pub async fn get_shopping_history(self: Arc<Self>, params: ShoppingHistoryParams) -> ToolResult {
        let to = params.date_to.unwrap_or_else(|| today(self.clock.as_ref()));
        let from = match params.date_from {
            Some(from) => from,
            None => to
                .with_day(1)
                .and_then(|first| first.checked_sub_months(Months::new(1)))
                .unwrap_or(to),
        };
        if from > to {
            return Err(DomainError::validation("date_from must not be after date_to"));
        }

        let expenses = self
            .expenses
            .query(
                Query::new()
                    .filter(move |e: &Expense| within(e.date, Some(from), Some(to)))
                    .filter_opt(params.store, |e: &Expense, store| {
                        e.store.as_deref().is_some_and(|s| text_eq(s, store))
                    })
                    .filter_opt(params.category, |e: &Expense, c| text_eq(&e.category, c))
                    .order_by(|a: &Expense, b: &Expense| a.date.cmp(&b.date)),
            )
            .await;

        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        let average = if expenses.is_empty() { 0.0 } else { total / expenses.len() as f64 };

        let top_stores: Vec<_> = tally(
            expenses
                .iter()
                .filter_map(|e| e.store.as_deref().map(|store| (store, e.amount))),
        )
        .into_iter()
        .take(TOP_ENTRIES)
        .map(|t| json!({ "name": t.name, "spent": round2(t.spent), "visits": t.count }))
        .collect();

        let top_categories: Vec<_> = tally(expenses.iter().map(|e| (e.category.as_str(), e.amount)))
            .into_iter()
            .take(TOP_ENTRIES)
            .map(|t| {
                let percentage = if total > 0.0 { t.spent / total * 100.0 } else { 0.0 };
                json!({ "name": t.name, "spent": round2(t.spent), "percentage": round1(percentage) })
            })
            .collect();

        let mut insights = Vec::new();
        if !expenses.is_empty() {
            let weeks = ((to - from).num_days() + 1) as f64 / 7.0;
            insights.push(format!("Average weekly spending: €{:.2}", total / weeks.max(1.0)));
        }
        if let Some(day) = busiest_weekday(&expenses) {
            insights.push(format!("Most active day: {}", day));
        }
        if let Some(biggest) = expenses.iter().max_by(|a, b| a.amount.total_cmp(&b.amount)) {
            let at = biggest.store.as_deref().unwrap_or("an unknown store");
            insights.push(format!("Biggest purchase: €{:.2} at {}", biggest.amount, at));
        }

        info!(
            "Retrieved shopping history {} to {}: {} purchases, €{:.2}",
            from,
            to,
            expenses.len(),
            total
        );
        Ok(json!({
            "period": { "from": from, "to": to },
            "total_spent": round2(total),
            "total_purchases": expenses.len(),
            "average_purchase": round2(average),
            "top_stores": top_stores,
            "top_categories": top_categories,
            "insights": insights,
        }))
    }
}
