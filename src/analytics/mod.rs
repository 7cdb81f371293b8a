pub mod completion;
pub mod heatmap;
pub mod overview;
pub mod range;
pub mod streak;

use serde::{Deserialize, Serialize};

use crate::models::Habit;

pub use completion::{bucket_by_month, completion_on, compute_completion};
pub use heatmap::{compute_heatmap, intensity, week_columns};
pub use overview::{build_overview, HabitSummary, Overview};
pub use range::{DateRange, TimeRange, WeekStart};
pub use streak::{compute_streak, StreakPolicy};

/// Which habits count toward totals. Every statistic in a view uses the same
/// scope so counts stay comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitScope {
    #[default]
    Active,
    All,
}

impl HabitScope {
    pub fn includes(&self, habit: &Habit) -> bool {
        match self {
            HabitScope::Active => habit.is_active,
            HabitScope::All => true,
        }
    }

    pub fn select(self, habits: &[Habit]) -> impl Iterator<Item = &Habit> {
        habits.iter().filter(move |h| self.includes(h))
    }

    pub fn toggled(&self) -> HabitScope {
        match self {
            HabitScope::Active => HabitScope::All,
            HabitScope::All => HabitScope::Active,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HabitScope::Active => "active habits",
            HabitScope::All => "all habits",
        }
    }
}
