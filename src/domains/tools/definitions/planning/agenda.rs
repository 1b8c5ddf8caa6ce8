//! Calendar events, productivity statistics and quotes.

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::PlanningManager;
use crate::core::clock::today;
use crate::core::store::Query;
use crate::core::store::query::text_eq;
use crate::domains::records::{Goal, GoalStatus, HabitStatus, TodoStatus};
use crate::domains::tools::{DomainError, NoParams, ToolResult, ToolSpec, round1, to_payload};

pub const PRODUCTIVITY_STATS: ToolSpec = ToolSpec::new(
    "get_productivity_stats",
    "Get todo, habit and goal statistics computed from the stored records.",
);

pub const CALENDAR_EVENTS: ToolSpec = ToolSpec::new(
    "get_calendar_events",
    "Get calendar events starting within an inclusive date range, ordered by start time.",
);

pub const MOTIVATIONAL_QUOTE: ToolSpec = ToolSpec::new(
    "get_motivational_quote",
    "Get a motivational quote (productivity, health, success or random).",
);

#[derive(Debug, Clone, Serialize)]
struct CalendarEvent {
    id: &'static str,
    title: &'static str,
    category: &'static str,
    start_time: &'static str,
    end_time: &'static str,
    location: &'static str,
    description: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reminder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendees: Option<&'static [&'static str]>,
}

impl CalendarEvent {
    fn start_date(&self) -> Option<NaiveDate> {
        let day = self.start_time.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

static EVENTS: &[CalendarEvent] = &[
    CalendarEvent {
        id: "event_000",
        title: "Weekly planning review",
        category: "Personal",
        start_time: "2025-12-14T18:00:00Z",
        end_time: "2025-12-14T18:30:00Z",
        location: "Home",
        description: "Review last week and plan the next one",
        status: "completed",
        reminder: None,
        attendees: None,
    },
    CalendarEvent {
        id: "event_002",
        title: "Grocery shopping",
        category: "Shopping",
        start_time: "2025-12-16T14:00:00Z",
        end_time: "2025-12-16T15:30:00Z",
        location: "Spar Stephansplatz",
        description: "Weekly grocery shopping",
        status: "pending",
        reminder: None,
        attendees: None,
    },
    CalendarEvent {
        id: "event_001",
        title: "Vet appointment for Benny",
        category: "Pets",
        start_time: "2025-12-16T09:00:00Z",
        end_time: "2025-12-16T10:00:00Z",
        location: "Tierklinik Vienna",
        description: "Annual checkup and vaccinations",
        status: "confirmed",
        reminder: Some("15 minutes before"),
        attendees: None,
    },
    CalendarEvent {
        id: "event_003",
        title: "Coffee with Marion",
        category: "Social",
        start_time: "2025-12-17T15:00:00Z",
        end_time: "2025-12-17T17:00:00Z",
        location: "Café Central",
        description: "Catch up with sister",
        status: "confirmed",
        reminder: None,
        attendees: Some(&["Marion", "Sandra"]),
    },
];

#[derive(Debug, Clone, Copy, Serialize)]
struct Quote {
    quote: &'static str,
    author: &'static str,
    category: &'static str,
}

const fn quote(quote: &'static str, author: &'static str, category: &'static str) -> Quote {
    Quote {
        quote,
        author,
        category,
    }
}

static QUOTES: &[(&str, &[Quote])] = &[
    (
        "productivity",
        &[
            quote(
                "The way to get started is to quit talking and begin doing.",
                "Walt Disney",
                "productivity",
            ),
            quote(
                "Productivity is never an accident. It is always the result of a commitment to excellence, intelligent planning, and focused effort.",
                "Paul J. Meyer",
                "productivity",
            ),
        ],
    ),
    (
        "health",
        &[quote(
            "Take care of your body. It's the only place you have to live.",
            "Jim Rohn",
            "health",
        )],
    ),
    (
        "success",
        &[quote(
            "Success is not final, failure is not fatal: It is the courage to continue that counts.",
            "Winston Churchill",
            "success",
        )],
    ),
    (
        "random",
        &[quote(
            "The best way to predict the future is to create it.",
            "Peter Drucker",
            "motivation",
        )],
    ),
];

fn quotes_for(category: &str) -> &'static [Quote] {
    QUOTES
        .iter()
        .find(|(name, _)| text_eq(name, category))
        .or_else(|| QUOTES.iter().find(|(name, _)| *name == "random"))
        .map(|(_, quotes)| *quotes)
        .unwrap_or_default()
}

fn default_true() -> bool {
    true
}

fn default_quote_category() -> String {
    "productivity".to_string()
}

/// Parameters for `get_calendar_events`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalendarParams {
    /// First day of the range (YYYY-MM-DD).
    #[schemars(with = "String")]
    pub date_from: NaiveDate,

    /// Last day of the range (YYYY-MM-DD).
    #[schemars(with = "String")]
    pub date_to: NaiveDate,

    /// Category filter.
    pub category: Option<String>,

    /// Include completed events.
    #[serde(default = "default_true")]
    pub include_completed: bool,
}

/// Parameters for `get_motivational_quote`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QuoteParams {
    /// Quote category: productivity, health, success or random.
    #[serde(default = "default_quote_category")]
    pub category: String,
}

impl Default for QuoteParams {
    fn default() -> Self {
        Self {
            category: default_quote_category(),
        }
    }
}

/// Whether an active goal's progress keeps pace with the time elapsed
/// between its creation and its target date.
fn on_track(goal: &Goal, today: NaiveDate) -> bool {
    let created = goal.created_at.date_naive();
    let span = (goal.target_date - created).num_days();
    let expected = if span <= 0 {
        100.0
    } else {
        let elapsed = (today - created).num_days().clamp(0, span);
        elapsed as f64 * 100.0 / span as f64
    };
    goal.progress_percentage() >= expected
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 * 100.0 / whole as f64)
    }
}

impl PlanningManager {
    pub async fn get_productivity_stats(self: Arc<Self>, _params: NoParams) -> ToolResult {
        let today = today(self.clock.as_ref());

        let todos = self.todos.all().await;
        let completed = todos.iter().filter(|t| t.status == TodoStatus::Completed).count();
        let overdue = todos.iter().filter(|t| t.is_overdue(today)).count();

        let habits = self.habits.all().await;
        let streaks: Vec<u32> = habits
            .iter()
            .map(|h| if h.is_broken(today) { 0 } else { h.current_streak })
            .collect();
        let average_streak = if streaks.is_empty() {
            0.0
        } else {
            round1(f64::from(streaks.iter().sum::<u32>()) / streaks.len() as f64)
        };
        let active_habits = habits.iter().filter(|h| h.status == HabitStatus::Active).count();

        let goals = self.goals.all().await;
        let active_goals: Vec<&Goal> = goals.iter().filter(|g| g.status == GoalStatus::Active).collect();
        let goals_on_track = active_goals.iter().filter(|g| on_track(g, today)).count();

        info!(
            "Generated productivity stats: {} todos, {} habits, {} goals",
            todos.len(),
            habits.len(),
            goals.len()
        );
        Ok(json!({
            "date": today,
            "todos": {
                "total": todos.len(),
                "completed": completed,
                "pending": todos.len() - completed,
                "overdue": overdue,
                "completion_rate": percentage(completed, todos.len()),
            },
            "habits": {
                "tracked_habits": habits.len(),
                "active_habits": active_habits,
                "average_streak": average_streak,
                "best_streak": habits.iter().map(|h| h.best_streak).max().unwrap_or(0),
            },
            "goals": {
                "active_goals": active_goals.len(),
                "completed_goals": goals.len() - active_goals.len(),
                "on_track": goals_on_track,
                "behind_schedule": active_goals.len() - goals_on_track,
            },
        }))
    }

    pub async fn get_calendar_events(self: Arc<Self>, params: CalendarParams) -> ToolResult {
        if params.date_from > params.date_to {
            return Err(DomainError::validation(format!(
                "date_from {} is after date_to {}",
                params.date_from, params.date_to
            )));
        }

        let (from, to) = (params.date_from, params.date_to);
        let include_completed = params.include_completed;
        let events = Query::new()
            .filter(move |e: &CalendarEvent| e.start_date().is_some_and(|d| from <= d && d <= to))
            .filter_opt(params.category, |e: &CalendarEvent, c| text_eq(e.category, c))
            .filter(move |e: &CalendarEvent| include_completed || e.status != "completed")
            .order_by(|a: &CalendarEvent, b: &CalendarEvent| a.start_time.cmp(b.start_time))
            .apply(EVENTS);

        info!("Retrieved {} calendar events", events.len());
        to_payload(&events)
    }

    /// Quotes rotate by day so repeated calls on one day agree.
    pub async fn get_motivational_quote(self: Arc<Self>, params: QuoteParams) -> ToolResult {
        let quotes = quotes_for(&params.category);
        let day = today(self.clock.as_ref()).ordinal0() as usize;
        let Some(selected) = quotes.get(day % quotes.len().max(1)) else {
            return Err(DomainError::not_found(format!("No quotes for category '{}'", params.category)));
        };

        info!("Retrieved {} quote by {}", params.category, selected.author);
        to_payload(selected)
    }
}
