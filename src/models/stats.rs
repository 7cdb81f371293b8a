use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current and best run of consecutive completed days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStats {
    pub current_streak: u32,
    pub max_streak: u32,
}

/// How many in-scope habits were completed on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPoint {
    pub date: NaiveDate,
    /// Short `MM/DD` axis label.
    pub label: String,
    pub completed_count: u32,
    pub total_habits: u32,
}

impl CompletionPoint {
    pub fn new(date: NaiveDate, completed_count: u32, total_habits: u32) -> Self {
        Self {
            date,
            label: date.format("%m/%d").to_string(),
            completed_count,
            total_habits,
        }
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.total_habits == 0 {
            0.0
        } else {
            self.completed_count as f64 / self.total_habits as f64
        }
    }

    /// Whole percentage, 0 when nothing is tracked.
    pub fn percent(&self) -> u32 {
        (self.completion_ratio() * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub date: NaiveDate,
    pub count: u32,
}
