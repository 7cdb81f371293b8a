use thiserror::Error;

/// Input rejected before it reaches the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Goal title cannot be empty")]
    EmptyTitle,
    #[error("Target must be at least 1")]
    ZeroTarget,
    #[error("'{0}' is not a #rrggbb colour")]
    BadColor(String),
    #[error("No habit matches '{0}'")]
    UnknownHabit(String),
    #[error("No category named '{0}'")]
    UnknownCategory(String),
    #[error("A category named '{0}' already exists")]
    DuplicateCategory(String),
    #[error("No goal with id {0}")]
    UnknownGoal(i64),
}
