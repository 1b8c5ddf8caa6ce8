//! Planning manager portmanteau.
//!
//! - `todos.rs` - todo lifecycle and category listing
//! - `goals.rs` - goals with logged progress events
//! - `habits.rs` - habits, completions and streaks
//! - `agenda.rs` - calendar events, productivity stats, quotes

mod agenda;
mod goals;
mod habits;
mod todos;

pub use agenda::{CalendarParams, QuoteParams};
pub use goals::{GoalProgressParams, GoalStatusFilter, LogProgressParams, SetGoalParams};
pub use habits::{CreateHabitParams, HabitStatusParams, HabitStreakParams, LogHabitParams};
pub use todos::{
    CompleteTodoParams, CreateTodoParams, DeleteTodoParams, TodoListParams, TodoStatusFilter,
    UpdateTodoParams,
};

use std::sync::Arc;

use crate::core::clock::SharedClock;
use crate::core::store::EntityStore;
use crate::domains::records::{Database, Goal, Habit, Todo};
use crate::domains::tools::{Portmanteau, ToolError, ToolRegistry};

pub static PLANNING: Portmanteau = Portmanteau {
    name: "planning_manager",
    description: "Todos, goals, habits, calendar events, productivity statistics and motivational quotes",
    categories: &["todos", "goals", "habits", "calendar", "productivity"],
};

/// Handlers for the planning tools.
pub struct PlanningManager {
    todos: Arc<EntityStore<Todo>>,
    goals: Arc<EntityStore<Goal>>,
    habits: Arc<EntityStore<Habit>>,
    clock: SharedClock,
}

impl PlanningManager {
    pub fn new(db: &Database, clock: SharedClock) -> Self {
        Self {
            todos: db.todos.clone(),
            goals: db.goals.clone(),
            habits: db.habits.clone(),
            clock,
        }
    }
}

/// Register every planning tool.
pub fn register_planning_tools(registry: &mut ToolRegistry, manager: Arc<PlanningManager>) -> Result<(), ToolError> {
    registry
        .portmanteau(&PLANNING)
        .register(todos::CREATE_TODO, manager.clone(), PlanningManager::create_todo)?
        .register(todos::UPDATE_TODO, manager.clone(), PlanningManager::update_todo)?
        .register(todos::COMPLETE_TODO, manager.clone(), PlanningManager::complete_todo)?
        .register(todos::DELETE_TODO, manager.clone(), PlanningManager::delete_todo)?
        .register(todos::TODOS_BY_CATEGORY, manager.clone(), PlanningManager::get_todos_by_category)?
        .register(goals::SET_GOAL, manager.clone(), PlanningManager::set_goal)?
        .register(goals::LOG_GOAL_PROGRESS, manager.clone(), PlanningManager::log_goal_progress)?
        .register(goals::GOALS_PROGRESS, manager.clone(), PlanningManager::get_goals_progress)?
        .register(habits::CREATE_HABIT, manager.clone(), PlanningManager::create_habit)?
        .register(habits::LOG_HABIT, manager.clone(), PlanningManager::log_habit_completion)?
        .register(habits::SET_HABIT_STATUS, manager.clone(), PlanningManager::set_habit_status)?
        .register(habits::HABIT_STREAK, manager.clone(), PlanningManager::get_habit_streak)?
        .register(agenda::PRODUCTIVITY_STATS, manager.clone(), PlanningManager::get_productivity_stats)?
        .register(agenda::CALENDAR_EVENTS, manager.clone(), PlanningManager::get_calendar_events)?
        .register(agenda::MOTIVATIONAL_QUOTE, manager, PlanningManager::get_motivational_quote)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::NaiveDate;

    /// Manager pinned to Monday 2025-12-15.
    pub fn manager() -> Arc<PlanningManager> {
        manager_on(date(2025, 12, 15))
    }

    pub fn manager_on(today: NaiveDate) -> Arc<PlanningManager> {
        let clock = FixedClock::on(today).shared();
        Arc::new(PlanningManager::new(&Database::in_memory(), clock))
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
