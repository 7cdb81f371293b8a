use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::habit::validate_target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GoalFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl GoalFilter {
    pub fn matches(&self, goal: &Goal) -> bool {
        match self {
            GoalFilter::All => true,
            GoalFilter::Active => !goal.is_completed,
            GoalFilter::Completed => goal.is_completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub habit_id: i64,
    pub habit_name: String,
    pub habit_color: String,
    pub title: String,
    pub description: Option<String>,
    /// Target length in days.
    pub target: u32,
    pub deadline: Option<NaiveDate>,
    pub is_completed: bool,
    pub created_at: String,
}

impl Goal {
    /// An open goal whose deadline lies before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.deadline.is_some_and(|d| d < today)
    }
}

#[derive(Debug, Clone)]
pub struct GoalDraft {
    pub habit_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub target: u32,
    pub deadline: Option<NaiveDate>,
}

impl GoalDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        validate_target(self.target)
    }
}

/// Partial update; `Some(None)` clears the description or deadline.
#[derive(Debug, Clone, Default)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub target: Option<u32>,
    pub deadline: Option<Option<NaiveDate>>,
}

impl GoalChanges {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.as_ref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ValidationError::EmptyTitle);
        }
        if let Some(target) = self.target {
            validate_target(target)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.target.is_none()
            && self.deadline.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_reject_blank_title_and_zero_target() {
        let blank = GoalChanges {
            title: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.validate(), Err(ValidationError::EmptyTitle));

        let zero = GoalChanges {
            target: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(ValidationError::ZeroTarget));

        let clear = GoalChanges {
            deadline: Some(None),
            ..Default::default()
        };
        assert_eq!(clear.validate(), Ok(()));
        assert!(!clear.is_empty());
        assert!(GoalChanges::default().is_empty());
    }
}
