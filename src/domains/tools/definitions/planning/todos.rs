//! Todo items.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::info;

use super::PlanningManager;
use crate::core::store::Query;
use crate::core::store::query::text_eq;
use crate::domains::records::{Priority, Todo, TodoStatus, TodoUpdate};
use crate::domains::tools::{ToolResult, ToolSpec, to_payload};

pub const CREATE_TODO: ToolSpec = ToolSpec::new(
    "create_todo",
    "Create a new todo item with category, priority and optional due date.",
);

pub const UPDATE_TODO: ToolSpec = ToolSpec::new(
    "update_todo",
    "Update fields of an existing todo. A completed todo cannot be reopened.",
);

pub const COMPLETE_TODO: ToolSpec = ToolSpec::new(
    "complete_todo",
    "Mark a todo as completed. Completing it again keeps the original completion time.",
);

pub const DELETE_TODO: ToolSpec = ToolSpec::new(
    "delete_todo",
    "Delete a todo. Requires confirm=true.",
);

pub const TODOS_BY_CATEGORY: ToolSpec = ToolSpec::new(
    "get_todos_by_category",
    "Get todos filtered by category, status and priority, highest priority first, then earliest due date.",
);

fn default_category() -> String {
    "General".to_string()
}

fn default_limit() -> usize {
    20
}

/// Status filter for todo listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TodoStatusFilter {
    fn admits(self, status: TodoStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == TodoStatus::Pending,
            Self::Completed => status == TodoStatus::Completed,
        }
    }
}

/// Parameters for `create_todo`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTodoParams {
    /// Todo title.
    pub title: String,

    /// Detailed description.
    pub description: Option<String>,

    /// Category for organization.
    #[serde(default = "default_category")]
    pub category: String,

    /// Priority level.
    #[serde(default)]
    pub priority: Priority,

    /// Due date (YYYY-MM-DD).
    #[schemars(with = "Option<String>")]
    pub due_date: Option<NaiveDate>,

    /// Estimated time to complete, e.g. "2h".
    pub estimated_time: Option<String>,
}

/// Parameters for `update_todo`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateTodoParams {
    /// ID of the todo.
    pub todo_id: u64,

    /// Fields to change.
    pub updates: TodoUpdate,
}

/// Parameters for `complete_todo`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompleteTodoParams {
    /// ID of the todo.
    pub todo_id: u64,

    /// Notes about the completion.
    pub completion_notes: Option<String>,
}

/// Parameters for `delete_todo`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteTodoParams {
    /// ID of the todo.
    pub todo_id: u64,

    /// Must be true to delete.
    #[serde(default)]
    pub confirm: bool,
}

/// Parameters for `get_todos_by_category`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TodoListParams {
    /// Category filter (case-insensitive).
    pub category: Option<String>,

    /// Status filter.
    #[serde(default)]
    pub status: TodoStatusFilter,

    /// Priority filter.
    pub priority: Option<Priority>,

    /// Maximum todos to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for TodoListParams {
    fn default() -> Self {
        Self {
            category: None,
            status: TodoStatusFilter::All,
            priority: None,
            limit: default_limit(),
        }
    }
}

/// High priority first, then earliest due date; todos without a due date
/// sort last.
fn by_urgency(a: &Todo, b: &Todo) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

impl PlanningManager {
    pub async fn create_todo(self: Arc<Self>, params: CreateTodoParams) -> ToolResult {
        let now = self.clock.utc();
        let todo = self
            .todos
            .create(Todo {
                id: 0,
                title: params.title,
                description: params.description,
                category: params.category,
                priority: params.priority,
                status: TodoStatus::Pending,
                due_date: params.due_date,
                estimated_time: params.estimated_time,
                completion_notes: None,
                created_at: now,
                updated_at: now,
                completed_at: None,
            })
            .await?;

        info!("Created todo: {} (priority: {:?})", todo.title, todo.priority);
        Ok(json!({
            "success": true,
            "todo": todo,
            "message": format!("Todo '{}' created successfully", todo.title),
        }))
    }

    pub async fn update_todo(self: Arc<Self>, params: UpdateTodoParams) -> ToolResult {
        let now = self.clock.utc();
        let updates = params.updates;
        let (todo, ()) = self
            .todos
            .modify(params.todo_id, move |todo| todo.revise(updates, now))
            .await?;

        info!("Updated todo {}", todo.id);
        Ok(json!({
            "success": true,
            "todo": todo,
            "message": format!("Todo {} updated successfully", todo.id),
        }))
    }

    pub async fn complete_todo(self: Arc<Self>, params: CompleteTodoParams) -> ToolResult {
        let now = self.clock.utc();
        let notes = params.completion_notes;
        let (todo, already_completed) = self
            .todos
            .modify(params.todo_id, move |todo| {
                let already = todo.status == TodoStatus::Completed;
                todo.complete(notes, now);
                Ok(already)
            })
            .await?;

        let message = if already_completed {
            format!("Todo '{}' was already completed", todo.title)
        } else {
            info!("Completed todo {}: {}", todo.id, todo.title);
            format!("Todo '{}' marked as completed", todo.title)
        };
        Ok(json!({
            "success": true,
            "todo": todo,
            "already_completed": already_completed,
            "message": message,
        }))
    }

    pub async fn delete_todo(self: Arc<Self>, params: DeleteTodoParams) -> ToolResult {
        let todo = self.todos.delete(params.todo_id, params.confirm).await?;

        info!("Deleted todo {}: {}", todo.id, todo.title);
        Ok(json!({
            "success": true,
            "deleted_todo": todo,
            "message": format!("Todo '{}' deleted successfully", todo.title),
        }))
    }

    pub async fn get_todos_by_category(self: Arc<Self>, params: TodoListParams) -> ToolResult {
        let status = params.status;
        let todos = self
            .todos
            .query(
                Query::new()
                    .filter_opt(params.category, |t: &Todo, c| text_eq(&t.category, c))
                    .filter(move |t: &Todo| status.admits(t.status))
                    .filter_opt(params.priority, |t: &Todo, p| t.priority == *p)
                    .order_by(by_urgency)
                    .limit(params.limit),
            )
            .await;

        info!("Retrieved {} todos matching criteria", todos.len());
        to_payload(&todos)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, manager};
    use super::*;
    use crate::domains::tools::DomainError;

    fn todo(title: &str, priority: Priority, due: Option<NaiveDate>) -> CreateTodoParams {
        CreateTodoParams {
            title: title.into(),
            description: None,
            category: default_category(),
            priority,
            due_date: due,
            estimated_time: None,
        }
    }

    async fn create(m: &Arc<PlanningManager>, params: CreateTodoParams) -> u64 {
        let created = m.clone().create_todo(params).await.unwrap();
        created["todo"]["id"].as_u64().unwrap()
    }

    fn titles(value: &serde_json::Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_high_priority_with_due_date_comes_first() {
        let m = manager();
        create(&m, todo("Read book", Priority::Low, None)).await;
        create(&m, todo("Pay rent", Priority::High, Some(date(2025, 1, 1)))).await;

        let todos = m.clone().get_todos_by_category(TodoListParams::default()).await.unwrap();
        assert_eq!(titles(&todos), vec!["Pay rent", "Read book"]);
    }

    #[tokio::test]
    async fn test_missing_due_dates_sort_last_within_priority() {
        let m = manager();
        create(&m, todo("No date", Priority::Medium, None)).await;
        create(&m, todo("Later", Priority::Medium, Some(date(2025, 12, 30)))).await;
        create(&m, todo("Sooner", Priority::Medium, Some(date(2025, 12, 20)))).await;
        create(&m, todo("Urgent", Priority::High, None)).await;

        let todos = m.clone().get_todos_by_category(TodoListParams::default()).await.unwrap();
        assert_eq!(titles(&todos), vec!["Urgent", "Sooner", "Later", "No date"]);

        let limited = m
            .clone()
            .get_todos_by_category(TodoListParams {
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(titles(&limited), vec!["Urgent", "Sooner"]);
    }

    #[tokio::test]
    async fn test_complete_twice_succeeds_and_keeps_first_time() {
        let m = manager();
        let id = create(&m, todo("Pay rent", Priority::High, None)).await;

        let first = m
            .clone()
            .complete_todo(CompleteTodoParams {
                todo_id: id,
                completion_notes: Some("Transferred".into()),
            })
            .await
            .unwrap();
        assert_eq!(first["todo"]["status"], "completed");
        assert_eq!(first["already_completed"], false);

        let second = m
            .clone()
            .complete_todo(CompleteTodoParams {
                todo_id: id,
                completion_notes: None,
            })
            .await
            .unwrap();
        assert_eq!(second["todo"]["status"], "completed");
        assert_eq!(second["already_completed"], true);
        assert_eq!(second["todo"]["completed_at"], first["todo"]["completed_at"]);
        assert_eq!(second["todo"]["completion_notes"], "Transferred");
    }

    #[tokio::test]
    async fn test_completed_todo_cannot_be_reopened() {
        let m = manager();
        let id = create(&m, todo("Pay rent", Priority::High, None)).await;
        m.clone()
            .complete_todo(CompleteTodoParams {
                todo_id: id,
                completion_notes: None,
            })
            .await
            .unwrap();

        let reopened = m
            .clone()
            .update_todo(UpdateTodoParams {
                todo_id: id,
                updates: TodoUpdate {
                    status: Some(TodoStatus::Pending),
                    ..Default::default()
                },
            })
            .await;
        assert!(matches!(reopened, Err(DomainError::Store(_))));
        assert_eq!(m.todos.find(id).await.unwrap().status, TodoStatus::Completed);
    }

    #[tokio::test]
    async fn test_filters_by_category_and_status() {
        let m = manager();
        create(
            &m,
            CreateTodoParams {
                category: "Home".into(),
                ..todo("Clean kitchen", Priority::Low, None)
            },
        )
        .await;
        let done = create(&m, todo("File taxes", Priority::High, None)).await;
        m.clone()
            .complete_todo(CompleteTodoParams {
                todo_id: done,
                completion_notes: None,
            })
            .await
            .unwrap();

        let home = m
            .clone()
            .get_todos_by_category(TodoListParams {
                category: Some("home".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(titles(&home), vec!["Clean kitchen"]);

        let completed = m
            .clone()
            .get_todos_by_category(TodoListParams {
                status: TodoStatusFilter::Completed,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(titles(&completed), vec!["File taxes"]);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let m = manager();
        let id = create(&m, todo("Pay rent", Priority::High, None)).await;

        let refused = m
            .clone()
            .delete_todo(DeleteTodoParams {
                todo_id: id,
                confirm: false,
            })
            .await;
        assert!(refused.is_err());
        assert_eq!(m.todos.len().await, 1);

        m.clone()
            .delete_todo(DeleteTodoParams {
                todo_id: id,
                confirm: true,
            })
            .await
            .unwrap();
        assert!(m.todos.is_empty().await);
    }
}
