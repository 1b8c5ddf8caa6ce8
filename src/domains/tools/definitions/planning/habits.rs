//! Habits, completions and streaks.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::PlanningManager;
use crate::core::clock::today;
use crate::core::store::Query;
use crate::domains::records::{Frequency, Habit, HabitStatus, HabitUpdate};
use crate::domains::tools::{ToolResult, ToolSpec, round1, to_payload};

pub const CREATE_HABIT: ToolSpec = ToolSpec::new(
    "create_habit",
    "Create a daily, weekly or monthly habit to track.",
);

pub const LOG_HABIT: ToolSpec = ToolSpec::new(
    "log_habit_completion",
    "Log a habit completion for a date (default: today) and update its streak.",
);

pub const SET_HABIT_STATUS: ToolSpec = ToolSpec::new(
    "set_habit_status",
    "Pause or resume a habit. Paused habits cannot be logged.",
);

pub const HABIT_STREAK: ToolSpec = ToolSpec::new(
    "get_habit_streak",
    "Get habit streaks, longest first. Broken streaks are hidden unless include_broken is set.",
);

fn default_target_count() -> u32 {
    1
}

/// Parameters for `create_habit`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Habit name.
    pub name: String,

    /// Habit description.
    pub description: Option<String>,

    /// How often the habit should be done.
    #[serde(default)]
    pub frequency: Frequency,

    /// Target completions per period.
    #[serde(default = "default_target_count")]
    pub target_count: u32,

    /// Reminder time (HH:MM).
    pub reminder_time: Option<String>,
}

/// Parameters for `log_habit_completion`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LogHabitParams {
    /// ID of the habit.
    pub habit_id: u64,

    /// Completion date (YYYY-MM-DD). Defaults to today.
    #[schemars(with = "Option<String>")]
    pub date: Option<NaiveDate>,

    /// Notes about the completion.
    pub notes: Option<String>,
}

/// Parameters for `set_habit_status`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HabitStatusParams {
    /// ID of the habit.
    pub habit_id: u64,

    /// New status.
    pub status: HabitStatus,
}

/// Parameters for `get_habit_streak`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct HabitStreakParams {
    /// Only this habit.
    pub habit_id: Option<u64>,

    /// Include habits whose streak has lapsed.
    #[serde(default)]
    pub include_broken: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum StreakStatus {
    Active,
    Broken,
}

#[derive(Debug, Serialize)]
struct HabitStreak {
    #[serde(flatten)]
    habit: Habit,
    streak_status: StreakStatus,
    /// Completions against the target for every period since creation.
    completion_rate: f64,
}

impl HabitStreak {
    fn new(mut habit: Habit, today: NaiveDate) -> Self {
        let broken = habit.is_broken(today);
        if broken {
            habit.current_streak = 0;
        }

        let created = habit.created_at.date_naive();
        let periods = habit.frequency.period_index(today) - habit.frequency.period_index(created) + 1;
        let expected = periods.max(1) as f64 * f64::from(habit.target_count);
        let completion_rate = round1((f64::from(habit.total_completions) / expected * 100.0).min(100.0));

        Self {
            habit,
            streak_status: if broken {
                StreakStatus::Broken
            } else {
                StreakStatus::Active
            },
            completion_rate,
        }
    }
}

impl PlanningManager {
    pub async fn create_habit(self: Arc<Self>, params: CreateHabitParams) -> ToolResult {
        let habit = self
            .habits
            .create(Habit {
                id: 0,
                name: params.name,
                description: params.description,
                frequency: params.frequency,
                target_count: params.target_count,
                reminder_time: params.reminder_time,
                current_streak: 0,
                best_streak: 0,
                total_completions: 0,
                status: HabitStatus::Active,
                last_completed: None,
                history: Vec::new(),
                created_at: self.clock.utc(),
            })
            .await?;

        info!("Created habit: {} ({:?})", habit.name, habit.frequency);
        Ok(json!({
            "success": true,
            "habit": habit,
            "message": format!("Habit '{}' created successfully", habit.name),
        }))
    }

    pub async fn log_habit_completion(self: Arc<Self>, params: LogHabitParams) -> ToolResult {
        let date = params.date.unwrap_or_else(|| today(self.clock.as_ref()));
        let notes = params.notes;
        let (habit, ()) = self
            .habits
            .modify(params.habit_id, move |habit| habit.record_completion(date, notes))
            .await?;

        info!(
            "Logged completion for habit {}: streak now {}",
            habit.id, habit.current_streak
        );
        Ok(json!({
            "success": true,
            "habit": habit,
            "message": format!("Habit '{}' completion logged successfully", habit.name),
        }))
    }

    pub async fn set_habit_status(self: Arc<Self>, params: HabitStatusParams) -> ToolResult {
        let habit = self
            .habits
            .update(
                params.habit_id,
                HabitUpdate {
                    status: Some(params.status),
                },
            )
            .await?;

        let state = match habit.status {
            HabitStatus::Active => "active",
            HabitStatus::Paused => "paused",
        };
        info!("Habit {} is now {}", habit.id, state);
        Ok(json!({
            "success": true,
            "habit": habit,
            "message": format!("Habit '{}' is now {}", habit.name, state),
        }))
    }

    pub async fn get_habit_streak(self: Arc<Self>, params: HabitStreakParams) -> ToolResult {
        let today = today(self.clock.as_ref());
        let mut streaks: Vec<_> = self
            .habits
            .query(Query::new().filter_opt(params.habit_id, |h: &Habit, id| h.id == *id))
            .await
            .into_iter()
            .map(|habit| HabitStreak::new(habit, today))
            .filter(|s| params.include_broken || s.streak_status == StreakStatus::Active)
            .collect();
        streaks.sort_by(|a, b| b.habit.current_streak.cmp(&a.habit.current_streak));

        info!("Retrieved streak information for {} habits", streaks.len());
        to_payload(&streaks)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, manager, manager_on};
    use super::*;

    fn habit(name: &str, frequency: Frequency) -> CreateHabitParams {
        CreateHabitParams {
            name: name.into(),
            description: None,
            frequency,
            target_count: 1,
            reminder_time: None,
        }
    }

    async fn create(m: &Arc<PlanningManager>, params: CreateHabitParams) -> u64 {
        let created = m.clone().create_habit(params).await.unwrap();
        created["habit"]["id"].as_u64().unwrap()
    }

    async fn log(m: &Arc<PlanningManager>, habit_id: u64, on: NaiveDate) -> serde_json::Value {
        m.clone()
            .log_habit_completion(LogHabitParams {
                habit_id,
                date: Some(on),
                notes: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_daily_streak_grows_and_resets() {
        let m = manager();
        let id = create(&m, habit("Reading", Frequency::Daily)).await;

        log(&m, id, date(2025, 12, 10)).await;
        log(&m, id, date(2025, 12, 11)).await;
        let same_day = log(&m, id, date(2025, 12, 11)).await;
        assert_eq!(same_day["habit"]["current_streak"], 2);

        let after_gap = log(&m, id, date(2025, 12, 14)).await;
        assert_eq!(after_gap["habit"]["current_streak"], 1);
        assert_eq!(after_gap["habit"]["best_streak"], 2);
        assert_eq!(after_gap["habit"]["total_completions"], 4);
    }

    #[tokio::test]
    async fn test_weekly_streak_counts_calendar_weeks() {
        let m = manager();
        let id = create(&m, habit("Long run", Frequency::Weekly)).await;

        // Sunday, then the following Monday: consecutive weeks
        log(&m, id, date(2025, 11, 30)).await;
        let next_week = log(&m, id, date(2025, 12, 1)).await;
        assert_eq!(next_week["habit"]["current_streak"], 2);
    }

    #[tokio::test]
    async fn test_paused_habit_rejects_logging() {
        let m = manager();
        let id = create(&m, habit("Meditation", Frequency::Daily)).await;
        m.clone()
            .set_habit_status(HabitStatusParams {
                habit_id: id,
                status: HabitStatus::Paused,
            })
            .await
            .unwrap();

        let result = m
            .clone()
            .log_habit_completion(LogHabitParams {
                habit_id: id,
                date: None,
                notes: None,
            })
            .await;
        assert!(result.is_err());
        assert_eq!(m.habits.find(id).await.unwrap().total_completions, 0);
    }

    #[tokio::test]
    async fn test_invalid_reminder_is_rejected() {
        let result = manager()
            .create_habit(CreateHabitParams {
                reminder_time: Some("7am".into()),
                ..habit("Stretching", Frequency::Daily)
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_streaks_sorted_and_broken_hidden() {
        let m = manager_on(date(2025, 12, 15));
        let reading = create(&m, habit("Reading", Frequency::Daily)).await;
        let walking = create(&m, habit("Walking", Frequency::Daily)).await;
        let lapsed = create(&m, habit("Piano", Frequency::Daily)).await;

        log(&m, reading, date(2025, 12, 15)).await;
        for day in 13..=15 {
            log(&m, walking, date(2025, 12, day)).await;
        }
        log(&m, lapsed, date(2025, 12, 1)).await;

        let active = m.clone().get_habit_streak(HabitStreakParams::default()).await.unwrap();
        let names: Vec<_> = active
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Walking", "Reading"]);

        let all = m
            .clone()
            .get_habit_streak(HabitStreakParams {
                habit_id: None,
                include_broken: true,
            })
            .await
            .unwrap();
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2]["name"], "Piano");
        assert_eq!(all[2]["streak_status"], "broken");
        assert_eq!(all[2]["current_streak"], 0);
    }
}
