//! Expense export and import in JSON or CSV.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::ExpensesManager;
use super::reports::group_by_category;
use crate::core::store::query::{text_eq, within};
use crate::core::store::Query;
use crate::domains::records::Expense;
use crate::domains::tools::{DomainError, ToolResult, ToolSpec, round2};

pub const EXPORT: ToolSpec = ToolSpec::new(
    "export_expenses",
    "Export expenses as JSON or CSV, optionally filtered by date range and category, with a summary.",
);

pub const IMPORT: ToolSpec = ToolSpec::new(
    "import_expenses",
    "Import expenses from JSON or CSV content in the export layout. Every row is validated before any is stored.",
);

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    #[default]
    Csv,
}

/// Parameters for `export_expenses`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExportParams {
    /// Output format.
    #[serde(default)]
    pub format: ExportFormat,

    /// Start date (YYYY-MM-DD), inclusive.
    #[schemars(with = "Option<String>")]
    pub date_from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), inclusive.
    #[schemars(with = "Option<String>")]
    pub date_to: Option<NaiveDate>,

    /// Category filter (case-insensitive).
    pub category: Option<String>,

    /// Include summary statistics.
    #[serde(default = "default_true")]
    pub include_summary: bool,
}

/// Parameters for `import_expenses`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ImportParams {
    /// Format of `content`.
    #[serde(default)]
    pub format: ExportFormat,

    /// Exported expenses.
    pub content: String,
}

/// One imported row. Ids and timestamps in the input are ignored.
#[derive(Debug, Deserialize)]
struct ImportRow {
    amount: f64,
    description: String,
    category: String,
    date: NaiveDate,
    store: Option<String>,
    payment_method: Option<String>,
}

fn render(format: ExportFormat, expenses: &[Expense]) -> Result<String, DomainError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(expenses)?),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for expense in expenses {
                writer
                    .serialize(expense)
                    .map_err(|e| DomainError::validation(format!("CSV export failed: {}", e)))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| DomainError::validation(format!("CSV export failed: {}", e)))?;
            String::from_utf8(bytes)
                .map_err(|e| DomainError::validation(format!("CSV export failed: {}", e)))
        }
    }
}

fn parse(format: ExportFormat, content: &str) -> Result<Vec<ImportRow>, DomainError> {
    match format {
        ExportFormat::Json => serde_json::from_str(content)
            .map_err(|e| DomainError::validation(format!("Invalid JSON import: {}", e))),
        ExportFormat::Csv => {
            let mut reader = csv::Reader::from_reader(content.as_bytes());
            reader
                .deserialize()
                .enumerate()
                .map(|(i, row)| {
                    row.map_err(|e| DomainError::validation(format!("Invalid CSV row {}: {}", i + 1, e)))
                })
                .collect()
        }
    }
}

impl ExpensesManager {
    pub async fn export_expenses(self: Arc<Self>, params: ExportParams) -> ToolResult {
        let (from, to) = (params.date_from, params.date_to);
        let expenses = self
            .expenses
            .query(
                Query::new()
                    .filter(move |e: &Expense| within(e.date, from, to))
                    .filter_opt(params.category.clone(), |e: &Expense, c| text_eq(&e.category, c)),
            )
            .await;

        let content = render(params.format, &expenses)?;

        let mut export = json!({
            "metadata": {
                "export_date": self.clock.utc().to_rfc3339(),
                "format": params.format,
                "total_expenses": expenses.len(),
                "date_range": { "from": from, "to": to },
                "filters": { "category": params.category },
            },
            "expenses": expenses,
            "content": content,
        });

        if params.include_summary {
            let total: f64 = expenses.iter().map(|e| e.amount).sum();
            let average = if expenses.is_empty() {
                0.0
            } else {
                total / expenses.len() as f64
            };
            export["summary"] = json!({
                "total_amount": round2(total),
                "average_amount": round2(average),
                "categories": group_by_category(&expenses),
                "date_range": {
                    "earliest": expenses.iter().map(|e| e.date).min(),
                    "latest": expenses.iter().map(|e| e.date).max(),
                },
            });
        }

        info!("Exported {} expenses as {:?}", expenses.len(), params.format);
        Ok(export)
    }

    pub async fn import_expenses(self: Arc<Self>, params: ImportParams) -> ToolResult {
        let rows = parse(params.format, &params.content)?;
        let now = self.clock.utc();

        let drafts = rows
            .into_iter()
            .map(|row| Expense {
                id: 0,
                amount: row.amount,
                description: row.description,
                category: row.category,
                date: row.date,
                store: row.store,
                payment_method: row.payment_method,
                created_at: now,
            })
            .collect();
        let imported = self.expenses.create_all(drafts).await?;

        info!("Imported {} expenses", imported.len());
        Ok(json!({
            "success": true,
            "imported": imported.len(),
            "expenses": imported,
            "message": format!("Imported {} expenses", imported.len()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, manager, spend};
    use super::*;

    fn export_all(format: ExportFormat) -> ExportParams {
        ExportParams {
            format,
            date_from: None,
            date_to: None,
            category: None,
            include_summary: true,
        }
    }

    /// Compare everything except id and created_at.
    fn same_records(a: &[Expense], b: &[Expense]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| {
                x.amount == y.amount
                    && x.description == y.description
                    && x.category == y.category
                    && x.date == y.date
                    && x.store == y.store
                    && x.payment_method == y.payment_method
            })
    }

    async fn seeded() -> Arc<ExpensesManager> {
        let m = manager();
        spend(&m, 42.5, "Food", date(2025, 1, 10)).await;
        spend(&m, 12.0, "Transport", date(2025, 1, 11)).await;
        m.clone()
            .add_expense(super::super::AddExpenseParams {
                amount: 8.9,
                description: "Kino, Nachmittag".into(),
                category: "Fun".into(),
                date: Some(date(2025, 1, 12)),
                store: Some("Village Cinema".into()),
                payment_method: Some("card".into()),
            })
            .await
            .unwrap();
        m
    }

    #[tokio::test]
    async fn test_export_applies_filters_and_summary() {
        let m = seeded().await;
        let export = m
            .clone()
            .export_expenses(ExportParams {
                date_from: Some(date(2025, 1, 11)),
                ..export_all(ExportFormat::Json)
            })
            .await
            .unwrap();

        assert_eq!(export["metadata"]["total_expenses"], 2);
        assert_eq!(export["metadata"]["format"], "json");
        assert_eq!(export["summary"]["total_amount"], 20.9);
        assert_eq!(export["summary"]["date_range"]["earliest"], "2025-01-11");
        assert_eq!(export["summary"]["categories"][0]["category"], "Transport");
    }

    #[tokio::test]
    async fn test_csv_export_has_header_and_rows() {
        let export = seeded().await.export_expenses(export_all(ExportFormat::Csv)).await.unwrap();
        let content = export["content"].as_str().unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("id,amount,description,category,date,store,payment_method,created_at")
        );
        assert_eq!(lines.count(), 3);
        assert!(content.contains("\"Kino, Nachmittag\""));
    }

    #[tokio::test]
    async fn test_export_then_import_reproduces_records() {
        for format in [ExportFormat::Csv, ExportFormat::Json] {
            let source = seeded().await;
            let export = source.clone().export_expenses(export_all(format)).await.unwrap();

            let target = manager();
            let imported = target
                .clone()
                .import_expenses(ImportParams {
                    format,
                    content: export["content"].as_str().unwrap().to_string(),
                })
                .await
                .unwrap();
            assert_eq!(imported["imported"], 3);

            assert!(same_records(&source.expenses.all().await, &target.expenses.all().await));
        }
    }

    #[tokio::test]
    async fn test_import_is_all_or_nothing() {
        let m = manager();
        let content = "amount,description,category,date\n\
                       10.0,Lunch,Food,2025-01-10\n\
                       -4.0,Refund,Food,2025-01-11\n";
        let result = m
            .clone()
            .import_expenses(ImportParams {
                format: ExportFormat::Csv,
                content: content.to_string(),
            })
            .await;
        assert!(result.is_err());
        assert!(m.expenses.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_import_reports_row() {
        let result = manager()
            .import_expenses(ImportParams {
                format: ExportFormat::Csv,
                content: "amount,description,category,date\nabc,Lunch,Food,2025-01-10\n".into(),
            })
            .await;
        let message = result.unwrap_err().to_string();
        assert!(message.starts_with("Invalid CSV row 1"), "{}", message);
    }
}
