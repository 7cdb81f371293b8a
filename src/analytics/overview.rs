use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use crate::analytics::{completion_on, compute_streak, HabitScope, StreakPolicy};
use crate::models::{Habit, StreakStats};

#[derive(Debug, Clone, Serialize)]
pub struct HabitSummary {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub is_active: bool,
    pub streak: StreakStats,
    pub done_today: bool,
    /// Share of logged entries that were completions, in whole percent.
    pub completion_rate: u32,
}

/// Dashboard numbers for one scope, all derived from the same habit set.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub scope: HabitScope,
    pub today: NaiveDate,
    pub tracked_habits: u32,
    pub completed_today: u32,
    pub today_rate: u32,
    pub best_streak: u32,
    pub live_streaks: u32,
    pub habits: Vec<HabitSummary>,
}

pub fn build_overview(
    habits: &[Habit],
    today: NaiveDate,
    scope: HabitScope,
    policy: &StreakPolicy,
) -> Overview {
    let summaries: Vec<HabitSummary> = scope
        .select(habits)
        .map(|habit| HabitSummary {
            id: habit.id,
            name: habit.name.clone(),
            color: habit.color.clone(),
            is_active: habit.is_active,
            streak: compute_streak(&habit.entries, today, policy),
            done_today: habit.is_completed_on(today),
            completion_rate: completion_rate(habit),
        })
        .collect();

    let point = completion_on(habits, today, scope);
    let best_streak = summaries.iter().map(|s| s.streak.max_streak).max().unwrap_or(0);
    let live_streaks = summaries.iter().filter(|s| s.streak.current_streak > 0).count() as u32;

    debug!(
        "overview for {}: {} habits, {}/{} done today",
        today,
        summaries.len(),
        point.completed_count,
        point.total_habits
    );

    Overview {
        scope,
        today,
        tracked_habits: point.total_habits,
        completed_today: point.completed_count,
        today_rate: point.percent(),
        best_streak,
        live_streaks,
        habits: summaries,
    }
}

/// Completed entries over logged entries, rounded to a whole percent.
pub fn completion_rate(habit: &Habit) -> u32 {
    if habit.entries.is_empty() {
        return 0;
    }
    let done = habit.entries.iter().filter(|e| e.is_completed()).count();
    ((done as f64 / habit.entries.len() as f64) * 100.0).round() as u32
}
