//! The set of entity stores shared by all portmanteaus.

use std::sync::Arc;
use tracing::info;

use super::{Budget, Expense, Goal, Habit, Playlist, ShoppingItem, ShoppingList, Todo};
use crate::core::config::StorageBackend;
use crate::core::store::{Entity, EntityStore, JsonSnapshot, StoreResult, TableSink};

/// One store per entity type, constructed once at startup and handed to each
/// portmanteau at registration.
#[derive(Clone)]
pub struct Database {
    pub expenses: Arc<EntityStore<Expense>>,
    pub budgets: Arc<EntityStore<Budget>>,
    pub shopping_lists: Arc<EntityStore<ShoppingList>>,
    pub shopping_items: Arc<EntityStore<ShoppingItem>>,
    pub todos: Arc<EntityStore<Todo>>,
    pub goals: Arc<EntityStore<Goal>>,
    pub habits: Arc<EntityStore<Habit>>,
    pub playlists: Arc<EntityStore<Playlist>>,
    backend: String,
}

impl Database {
    /// Empty, volatile stores.
    pub fn in_memory() -> Self {
        Self {
            expenses: Arc::default(),
            budgets: Arc::default(),
            shopping_lists: Arc::default(),
            shopping_items: Arc::default(),
            todos: Arc::default(),
            goals: Arc::default(),
            habits: Arc::default(),
            playlists: Arc::default(),
            backend: "memory".to_string(),
        }
    }

    /// Open the stores for the configured backend.
    ///
    /// For a JSON snapshot every table is loaded up front; a malformed table
    /// fails startup.
    pub async fn open(backend: &StorageBackend) -> StoreResult<Self> {
        match backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Ok(Self::in_memory())
            }
            StorageBackend::JsonFile(path) => {
                let snapshot = Arc::new(JsonSnapshot::open(path.clone()).await?);
                let db = Self {
                    expenses: load(&snapshot).await?,
                    budgets: load(&snapshot).await?,
                    shopping_lists: load(&snapshot).await?,
                    shopping_items: load(&snapshot).await?,
                    todos: load(&snapshot).await?,
                    goals: load(&snapshot).await?,
                    habits: load(&snapshot).await?,
                    playlists: load(&snapshot).await?,
                    backend: format!("json://{}", path.display()),
                };
                info!("Loaded JSON snapshot from {}", path.display());
                Ok(db)
            }
        }
    }

    /// Human-readable backend description.
    pub fn backend(&self) -> &str {
        &self.backend
    }
}

async fn load<T: Entity>(snapshot: &Arc<JsonSnapshot>) -> StoreResult<Arc<EntityStore<T>>> {
    let records = snapshot.table::<T>(T::TABLE).await?;
    let sink: Arc<dyn TableSink> = snapshot.clone();
    Ok(Arc::new(EntityStore::with_records(records, Some(sink))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::records::ShoppingList;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_backend_starts_empty() {
        let db = Database::open(&StorageBackend::Memory).await.unwrap();
        assert!(db.expenses.is_empty().await);
        assert_eq!(db.backend(), "memory");
    }

    #[tokio::test]
    async fn test_json_backend_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let backend = StorageBackend::JsonFile(dir.path().join("vienna.json"));

        let db = Database::open(&backend).await.unwrap();
        db.shopping_lists
            .create(ShoppingList {
                id: 0,
                name: "Weekend".into(),
                description: None,
                store_preference: Some("Billa".into()),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let reopened = Database::open(&backend).await.unwrap();
        let lists = reopened.shopping_lists.all().await;
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Weekend");
        assert!(reopened.backend().starts_with("json://"));
    }
}
