//! Todos, goals and habits.
//!
//! Status machines:
//! - todo: `pending -> completed` (terminal)
//! - goal: `active -> completed` (terminal, reached by logged progress)
//! - habit: `active <-> paused`
//!
//! Transitions are methods on the records so every caller goes through the
//! same checks. [`EntityStore::modify`](crate::core::store::EntityStore::modify)
//! runs them against a copy and commits only on success.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use super::require_text;
use crate::core::store::{Entity, StoreError, StoreResult};

// ============================================================================
// Todo
// ============================================================================

/// Todo priority. Orders `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: Priority,
    pub status: TodoStatus,
    pub due_date: Option<NaiveDate>,
    pub estimated_time: Option<String>,
    pub completion_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Mutable todo fields. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TodoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TodoStatus>,
    /// Due date (YYYY-MM-DD).
    #[schemars(with = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub estimated_time: Option<String>,
}

impl Todo {
    /// Apply an update, refusing to reopen a completed todo.
    pub fn revise(&mut self, update: TodoUpdate, now: DateTime<Utc>) -> StoreResult<()> {
        if self.status == TodoStatus::Completed && update.status == Some(TodoStatus::Pending) {
            return Err(StoreError::validation(format!(
                "Todo {} is completed and cannot be reopened",
                self.id
            )));
        }

        let completing = self.status == TodoStatus::Pending && update.status == Some(TodoStatus::Completed);
        self.apply(update);
        if completing {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Mark the todo completed.
    ///
    /// Completing twice is accepted; the first completion time is kept and
    /// notes are only replaced when new ones are given.
    pub fn complete(&mut self, notes: Option<String>, now: DateTime<Utc>) {
        if self.status == TodoStatus::Pending {
            self.status = TodoStatus::Completed;
            self.completed_at = Some(now);
        }
        if notes.is_some() {
            self.completion_notes = notes;
        }
        self.updated_at = now;
    }

    /// Pending and past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == TodoStatus::Pending && self.due_date.is_some_and(|due| due < today)
    }
}

impl Entity for Todo {
    const KIND: &'static str = "Todo";
    const TABLE: &'static str = "todos";
    type Update = TodoUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, update: TodoUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(estimated_time) = update.estimated_time {
            self.estimated_time = Some(estimated_time);
        }
    }

    fn validate(&self) -> StoreResult<()> {
        require_text("title", &self.title)?;
        require_text("category", &self.category)
    }
}

// ============================================================================
// Goal
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
}

/// One logged unit of progress toward a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub date: NaiveDate,
    pub amount: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub target_value: f64,
    /// Sum of `progress_log` amounts.
    pub current_value: f64,
    pub target_date: NaiveDate,
    pub measurement_unit: Option<String>,
    pub status: GoalStatus,
    pub progress_log: Vec<ProgressEntry>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Goal {
    /// Append a progress event and recompute the current value.
    pub fn record_progress(&mut self, entry: ProgressEntry, now: DateTime<Utc>) -> StoreResult<()> {
        if self.status == GoalStatus::Completed {
            return Err(StoreError::validation(format!(
                "Goal {} is already completed",
                self.id
            )));
        }
        if !entry.amount.is_finite() || entry.amount <= 0.0 {
            return Err(StoreError::validation(format!(
                "Progress amount must be a positive number, got {}",
                entry.amount
            )));
        }

        self.progress_log.push(entry);
        self.current_value = self.progress_log.iter().map(|e| e.amount).sum();

        if self.current_value >= self.target_value {
            self.status = GoalStatus::Completed;
            self.completed_at = Some(now);
        }
        Ok(())
    }

    /// Progress toward the target in percent, capped at 100.
    pub fn progress_percentage(&self) -> f64 {
        (self.current_value * 100.0 / self.target_value).min(100.0)
    }
}

impl Entity for Goal {
    const KIND: &'static str = "Goal";
    const TABLE: &'static str = "goals";
    type Update = Infallible;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, update: Infallible) {
        match update {}
    }

    fn validate(&self) -> StoreResult<()> {
        require_text("title", &self.title)?;
        require_text("category", &self.category)?;
        if !self.target_value.is_finite() || self.target_value <= 0.0 {
            return Err(StoreError::validation(format!(
                "target_value must be a positive number, got {}",
                self.target_value
            )));
        }
        if self.current_value < 0.0 {
            return Err(StoreError::validation("current_value must not be negative"));
        }
        Ok(())
    }
}

// ============================================================================
// Habit
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Sequential index of the calendar period containing `date`.
    ///
    /// Consecutive periods differ by exactly one. Weeks start on Monday.
    pub fn period_index(self, date: NaiveDate) -> i64 {
        match self {
            Self::Daily => i64::from(date.num_days_from_ce()),
            Self::Weekly => {
                let monday = date.num_days_from_ce() - date.weekday().num_days_from_monday() as i32;
                i64::from(monday.div_euclid(7))
            }
            Self::Monthly => i64::from(date.year()) * 12 + i64::from(date.month0()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    #[default]
    Active,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub target_count: u32,
    /// Reminder time of day (HH:MM).
    pub reminder_time: Option<String>,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_completions: u32,
    pub status: HabitStatus,
    pub last_completed: Option<NaiveDate>,
    pub history: Vec<HabitCompletion>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub status: Option<HabitStatus>,
}

impl Habit {
    /// Record a completion on `date` and update the streak.
    ///
    /// Streaks count consecutive calendar periods of the habit's frequency:
    /// another completion in the same period keeps the streak, the next
    /// period extends it, and a skipped period restarts it at one. Entries
    /// dated before `last_completed` only count toward the total.
    pub fn record_completion(&mut self, date: NaiveDate, notes: Option<String>) -> StoreResult<()> {
        if self.status == HabitStatus::Paused {
            return Err(StoreError::validation(format!(
                "Habit {} is paused. Resume it before logging completions",
                self.id
            )));
        }

        match self.last_completed {
            None => {
                self.current_streak = 1;
                self.last_completed = Some(date);
            }
            Some(last) if date >= last => {
                let gap = self.frequency.period_index(date) - self.frequency.period_index(last);
                match gap {
                    0 => self.current_streak = self.current_streak.max(1),
                    1 => self.current_streak += 1,
                    _ => self.current_streak = 1,
                }
                self.last_completed = Some(date);
            }
            Some(_) => {}
        }

        self.total_completions += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
        self.history.push(HabitCompletion { date, notes });
        Ok(())
    }

    /// Whether the streak has lapsed as of `today`: the last completion is
    /// more than one period behind.
    pub fn is_broken(&self, today: NaiveDate) -> bool {
        match self.last_completed {
            Some(last) => self.frequency.period_index(today) - self.frequency.period_index(last) > 1,
            None => true,
        }
    }
}

impl Entity for Habit {
    const KIND: &'static str = "Habit";
    const TABLE: &'static str = "habits";
    type Update = HabitUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, update: HabitUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
    }

    fn validate(&self) -> StoreResult<()> {
        require_text("name", &self.name)?;
        if self.target_count == 0 {
            return Err(StoreError::validation("target_count must be at least 1"));
        }
        if let Some(reminder) = &self.reminder_time {
            NaiveTime::parse_from_str(reminder, "%H:%M").map_err(|_| {
                StoreError::validation(format!("reminder_time must be HH:MM, got '{}'", reminder))
            })?;
        }
        if self.best_streak < self.current_streak {
            return Err(StoreError::validation("best_streak must not be below current_streak"));
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

    fn todo() -> Todo {
        let now = Utc::now();
        Todo {
            id: 1,
            title: "Pay rent".into(),
            description: None,
            category: "General".into(),
            priority: Priority::High,
            status: TodoStatus::Pending,
            due_date: Some(date(2025, 1, 1)),
            estimated_time: None,
            completion_notes: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn habit(frequency: Frequency) -> Habit {
        Habit {
            id: 1,
            name: "Run".into(),
            description: None,
            frequency,
            target_count: 1,
            reminder_time: None,
            current_streak: 0,
            best_streak: 0,
            total_completions: 0,
            status: HabitStatus::Active,
            last_completed: None,
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_priority_orders_high_last() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_complete_twice_keeps_first_timestamp() {
        let mut todo = todo();
        let first = Utc::now();
        todo.complete(None, first);
        let later = first + chrono::Duration::hours(1);
        todo.complete(Some("done".into()), later);

        assert_eq!(todo.status, TodoStatus::Completed);
        assert_eq!(todo.completed_at, Some(first));
        assert_eq!(todo.completion_notes.as_deref(), Some("done"));
    }

    #[test]
    fn test_completed_todo_cannot_be_reopened() {
        let mut todo = todo();
        todo.complete(None, Utc::now());
        let update = TodoUpdate {
            status: Some(TodoStatus::Pending),
            ..Default::default()
        };
        assert!(todo.revise(update, Utc::now()).is_err());
    }

    #[test]
    fn test_goal_completes_when_target_reached() {
        let mut goal = Goal {
            id: 1,
            title: "Read".into(),
            description: "Books".into(),
            category: "Personal".into(),
            target_value: 10.0,
            current_value: 0.0,
            target_date: date(2025, 12, 31),
            measurement_unit: Some("books".into()),
            status: GoalStatus::Active,
            progress_log: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        };
        let entry = |amount| ProgressEntry { date: date(2025, 1, 1), amount, note: None };

        goal.record_progress(entry(4.0), Utc::now()).unwrap();
        assert_eq!(goal.current_value, 4.0);
        assert_eq!(goal.progress_percentage(), 40.0);

        goal.record_progress(entry(6.0), Utc::now()).unwrap();
        assert_eq!(goal.status, GoalStatus::Completed);
        assert!(goal.record_progress(entry(1.0), Utc::now()).is_err());
    }

    #[test]
    fn test_daily_streak_arithmetic() {
        let mut habit = habit(Frequency::Daily);
        habit.record_completion(date(2025, 1, 1), None).unwrap();
        habit.record_completion(date(2025, 1, 2), None).unwrap();
        habit.record_completion(date(2025, 1, 2), None).unwrap();
        assert_eq!(habit.current_streak, 2);
        assert_eq!(habit.total_completions, 3);

        habit.record_completion(date(2025, 1, 5), None).unwrap();
        assert_eq!(habit.current_streak, 1);
        assert_eq!(habit.best_streak, 2);

        // back-dated entries only count toward the total
        habit.record_completion(date(2024, 12, 31), None).unwrap();
        assert_eq!(habit.current_streak, 1);
        assert_eq!(habit.total_completions, 5);
        assert_eq!(habit.last_completed, Some(date(2025, 1, 5)));
    }

    #[test]
    fn test_weekly_streak_uses_calendar_weeks() {
        let mut habit = habit(Frequency::Weekly);
        // Sunday, then the following Monday: consecutive ISO weeks
        habit.record_completion(date(2025, 1, 12), None).unwrap();
        habit.record_completion(date(2025, 1, 13), None).unwrap();
        assert_eq!(habit.current_streak, 2);

        // same week
        habit.record_completion(date(2025, 1, 17), None).unwrap();
        assert_eq!(habit.current_streak, 2);

        // skipped a week
        habit.record_completion(date(2025, 2, 1), None).unwrap();
        assert_eq!(habit.current_streak, 1);
    }

    #[test]
    fn test_paused_habit_rejects_logging() {
        let mut habit = habit(Frequency::Daily);
        habit.apply(HabitUpdate { status: Some(HabitStatus::Paused) });
        assert!(habit.record_completion(date(2025, 1, 1), None).is_err());
        assert_eq!(habit.total_completions, 0);
    }

    #[test]
    fn test_reminder_time_must_be_clock_time() {
        let mut habit = habit(Frequency::Daily);
        habit.reminder_time = Some("7am".into());
        assert!(habit.validate().is_err());
        habit.reminder_time = Some("07:30".into());
        assert!(habit.validate().is_ok());
    }
}
