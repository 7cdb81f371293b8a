pub mod category;
pub mod goal;
pub mod habit;
pub mod stats;

pub use category::{Category, CategoryDraft};
pub use goal::{Goal, GoalChanges, GoalDraft, GoalFilter};
pub use habit::{Frequency, Habit, HabitChanges, HabitDraft, HabitEntry, StatusFilter};
pub use stats::{CompletionPoint, HeatmapPoint, StreakStats};
