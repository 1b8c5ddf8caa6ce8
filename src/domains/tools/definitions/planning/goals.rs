//! Goals and logged progress.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::PlanningManager;
use crate::core::clock::today;
use crate::core::store::Query;
use crate::domains::records::{Goal, GoalStatus, ProgressEntry};
use crate::domains::tools::{ToolResult, ToolSpec, round1, to_payload};

pub const SET_GOAL: ToolSpec = ToolSpec::new(
    "set_goal",
    "Set a new goal with a positive target value and a target date.",
);

pub const LOG_GOAL_PROGRESS: ToolSpec = ToolSpec::new(
    "log_goal_progress",
    "Log progress toward a goal. Reaching the target completes the goal.",
);

pub const GOALS_PROGRESS: ToolSpec = ToolSpec::new(
    "get_goals_progress",
    "Get goals with progress percentage, days remaining and urgency.",
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl GoalStatusFilter {
    fn admits(self, status: GoalStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == GoalStatus::Active,
            Self::Completed => status == GoalStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    fn from_days_remaining(days: i64) -> Self {
        if days < 7 {
            Self::High
        } else if days < 14 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Parameters for `set_goal`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetGoalParams {
    /// Goal title.
    pub title: String,

    /// Goal description.
    pub description: String,

    /// Goal category, e.g. "Health" or "Career".
    pub category: String,

    /// Target value to reach.
    pub target_value: f64,

    /// Target completion date (YYYY-MM-DD).
    #[schemars(with = "String")]
    pub target_date: NaiveDate,

    /// Unit of measurement, e.g. "km" or "books".
    pub measurement_unit: Option<String>,
}

/// Parameters for `log_goal_progress`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LogProgressParams {
    /// ID of the goal.
    pub goal_id: u64,

    /// Progress amount in the goal's unit.
    pub amount: f64,

    /// Date of the progress (YYYY-MM-DD). Defaults to today.
    #[schemars(with = "Option<String>")]
    pub date: Option<NaiveDate>,

    /// Optional note.
    pub note: Option<String>,
}

/// Parameters for `get_goals_progress`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GoalProgressParams {
    /// Only this goal.
    pub goal_id: Option<u64>,

    /// Status filter.
    #[serde(default)]
    pub status: GoalStatusFilter,
}

#[derive(Debug, Serialize)]
struct GoalProgress {
    #[serde(flatten)]
    goal: Goal,
    progress_percentage: f64,
    days_remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    urgency: Option<Urgency>,
}

impl GoalProgress {
    fn new(goal: Goal, today: NaiveDate) -> Self {
        let days_remaining = (goal.target_date - today).num_days();
        let urgency = (goal.status == GoalStatus::Active).then(|| Urgency::from_days_remaining(days_remaining));
        Self {
            progress_percentage: round1(goal.progress_percentage()),
            days_remaining,
            urgency,
            goal,
        }
    }
}

impl PlanningManager {
    pub async fn set_goal(self: Arc<Self>, params: SetGoalParams) -> ToolResult {
        let goal = self
            .goals
            .create(Goal {
                id: 0,
                title: params.title,
                description: params.description,
                category: params.category,
                target_value: params.target_value,
                current_value: 0.0,
                target_date: params.target_date,
                measurement_unit: params.measurement_unit,
                status: GoalStatus::Active,
                progress_log: Vec::new(),
                created_at: self.clock.utc(),
                completed_at: None,
            })
            .await?;

        info!(
            "Set goal: {} (target: {} by {})",
            goal.title, goal.target_value, goal.target_date
        );
        Ok(json!({
            "success": true,
            "goal": goal,
            "message": format!("Goal '{}' set successfully", goal.title),
        }))
    }

    pub async fn log_goal_progress(self: Arc<Self>, params: LogProgressParams) -> ToolResult {
        let now = self.clock.utc();
        let entry = ProgressEntry {
            date: params.date.unwrap_or_else(|| today(self.clock.as_ref())),
            amount: params.amount,
            note: params.note,
        };

        let (goal, ()) = self
            .goals
            .modify(params.goal_id, move |goal| goal.record_progress(entry, now))
            .await?;

        let completed = goal.status == GoalStatus::Completed;
        let message = if completed {
            info!("Goal {} reached its target", goal.id);
            format!("Goal '{}' completed", goal.title)
        } else {
            format!(
                "Logged {} toward '{}' ({:.1}%)",
                params.amount,
                goal.title,
                goal.progress_percentage()
            )
        };
        Ok(json!({
            "success": true,
            "goal": goal,
            "progress_percentage": round1(goal.progress_percentage()),
            "completed": completed,
            "message": message,
        }))
    }

    pub async fn get_goals_progress(self: Arc<Self>, params: GoalProgressParams) -> ToolResult {
        let today = today(self.clock.as_ref());
        let status = params.status;
        let goals: Vec<_> = self
            .goals
            .query(
                Query::new()
                    .filter_opt(params.goal_id, |g: &Goal, id| g.id == *id)
                    .filter(move |g: &Goal| status.admits(g.status)),
            )
            .await
            .into_iter()
            .map(|goal| GoalProgress::new(goal, today))
            .collect();

        info!("Retrieved progress for {} goals", goals.len());
        to_payload(&goals)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, manager};
    use super::*;

    fn reading_goal(target_date: NaiveDate) -> SetGoalParams {
        SetGoalParams {
            title: "Read 10 books".into(),
            description: "Finish ten books this winter".into(),
            category: "Personal".into(),
            target_value: 10.0,
            target_date,
            measurement_unit: Some("books".into()),
        }
    }

    fn progress(goal_id: u64, amount: f64) -> LogProgressParams {
        LogProgressParams {
            goal_id,
            amount,
            date: None,
            note: None,
        }
    }

    async fn goal(m: &Arc<PlanningManager>, target_date: NaiveDate) -> u64 {
        let created = m.clone().set_goal(reading_goal(target_date)).await.unwrap();
        created["goal"]["id"].as_u64().unwrap()
    }

    #[tokio::test]
    async fn test_progress_is_summed_from_logged_events() {
        let m = manager();
        let id = goal(&m, date(2026, 3, 1)).await;

        m.clone().log_goal_progress(progress(id, 2.0)).await.unwrap();
        let logged = m.clone().log_goal_progress(progress(id, 4.5)).await.unwrap();
        assert_eq!(logged["goal"]["current_value"], 6.5);
        assert_eq!(logged["progress_percentage"], 65.0);
        assert_eq!(logged["completed"], false);
        assert_eq!(logged["goal"]["progress_log"].as_array().unwrap().len(), 2);
        assert_eq!(logged["goal"]["progress_log"][0]["date"], "2025-12-15");
    }

    #[tokio::test]
    async fn test_reaching_target_completes_goal() {
        let m = manager();
        let id = goal(&m, date(2026, 3, 1)).await;

        let done = m.clone().log_goal_progress(progress(id, 12.0)).await.unwrap();
        assert_eq!(done["completed"], true);
        assert_eq!(done["goal"]["status"], "completed");
        assert_eq!(done["progress_percentage"], 100.0);

        let after = m.clone().log_goal_progress(progress(id, 1.0)).await;
        assert_eq!(after.unwrap_err().to_string(), format!("Goal {} is already completed", id));
    }

    #[tokio::test]
    async fn test_target_value_must_be_positive() {
        let result = manager()
            .set_goal(SetGoalParams {
                target_value: 0.0,
                ..reading_goal(date(2026, 3, 1))
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_urgency_follows_days_remaining() {
        let m = manager();
        goal(&m, date(2025, 12, 20)).await;
        goal(&m, date(2025, 12, 27)).await;
        goal(&m, date(2026, 2, 1)).await;

        let goals = m.clone().get_goals_progress(GoalProgressParams::default()).await.unwrap();
        assert_eq!(goals[0]["days_remaining"], 5);
        assert_eq!(goals[0]["urgency"], "high");
        assert_eq!(goals[1]["urgency"], "medium");
        assert_eq!(goals[2]["urgency"], "low");
    }

    #[tokio::test]
    async fn test_completed_goals_have_no_urgency() {
        let m = manager();
        let id = goal(&m, date(2025, 12, 20)).await;
        goal(&m, date(2025, 12, 20)).await;
        m.clone().log_goal_progress(progress(id, 10.0)).await.unwrap();

        let completed = m
            .clone()
            .get_goals_progress(GoalProgressParams {
                goal_id: None,
                status: GoalStatusFilter::Completed,
            })
            .await
            .unwrap();
        let completed = completed.as_array().unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].get("urgency").is_none());

        let missing = m
            .clone()
            .get_goals_progress(GoalProgressParams {
                goal_id: Some(99),
                status: GoalStatusFilter::All,
            })
            .await
            .unwrap();
        assert!(missing.as_array().unwrap().is_empty());
    }
}
