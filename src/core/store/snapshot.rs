//! JSON snapshot persistence for entity stores.
//!
//! The snapshot file holds one JSON array per table:
//!
//! ```json
//! { "expenses": [ ... ], "todos": [ ... ] }
//! ```
//!
//! Every mutation rewrites the whole file through a temporary sibling and a
//! rename, so a crash never leaves a half-written snapshot behind.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::{StoreError, StoreResult};

/// Destination for a store's table after each mutation.
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Replace the stored contents of `table` with `rows`.
    async fn write_table(&self, table: &'static str, rows: Value) -> StoreResult<()>;
}

/// A single JSON file holding every table.
pub struct JsonSnapshot {
    path: PathBuf,
    tables: Mutex<Map<String, Value>>,
}

impl JsonSnapshot {
    /// Open (or start) a snapshot at `path`.
    ///
    /// A missing file is an empty database. A file that exists but is not a
    /// JSON object is an error.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(StoreError::persistence(format!(
                        "Snapshot {} is not a JSON object",
                        path.display()
                    )));
                }
                Err(e) => {
                    return Err(StoreError::persistence(format!(
                        "Snapshot {} is unreadable: {}",
                        path.display(),
                        e
                    )));
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Snapshot {} not found, starting empty", path.display());
                Map::new()
            }
            Err(e) => {
                return Err(StoreError::persistence(format!(
                    "Failed to read snapshot {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the rows of one table. Missing tables are empty.
    pub async fn table<T: DeserializeOwned>(&self, table: &str) -> StoreResult<Vec<T>> {
        let tables = self.tables.lock().await;
        match tables.get(table) {
            Some(rows) => serde_json::from_value(rows.clone()).map_err(|e| {
                StoreError::persistence(format!("Table '{}' is malformed: {}", table, e))
            }),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl TableSink for JsonSnapshot {
    async fn write_table(&self, table: &'static str, rows: Value) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;

        // The shared map only changes once the file on disk does.
        let mut staged = tables.clone();
        staged.insert(table.to_string(), rows);

        let bytes = serde_json::to_vec_pretty(&staged)
            .map_err(|e| StoreError::persistence(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::persistence(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            StoreError::persistence(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        *tables = staged;
        debug!("Snapshot table '{}' written to {}", table, self.path.display());
        Ok(())
    }
}
