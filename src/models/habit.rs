use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Custom => "Custom",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "custom" => Ok(Frequency::Custom),
            _ => Err(anyhow::anyhow!("Unknown frequency: {}", s)),
        }
    }
}

/// Which habits `list` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches(&self, habit: &Habit) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => habit.is_active,
            StatusFilter::Inactive => !habit.is_active,
        }
    }
}

/// One dated observation for a habit. Any positive `value` counts as done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub value: u32,
    pub notes: Option<String>,
}

impl HabitEntry {
    pub fn new(date: NaiveDate, value: u32) -> Self {
        Self {
            id: None,
            date,
            value,
            notes: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.value > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub frequency: Frequency,
    pub target: u32,
    pub unit: Option<String>,
    pub category: Option<Category>,
    pub is_active: bool,
    pub created_at: String,
    /// Unordered; analytics re-sort by date.
    pub entries: Vec<HabitEntry>,
}

impl Habit {
    /// First entry logged for `date`, in collection order.
    pub fn entry_on(&self, date: NaiveDate) -> Option<&HabitEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.entries
            .iter()
            .any(|e| e.date == date && e.is_completed())
    }

    /// Case-insensitive match against name, description or category name.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
            || self
                .category
                .as_ref()
                .is_some_and(|c| c.name.to_lowercase().contains(&query))
    }

    pub fn target_label(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} {}", self.target, unit),
            None => self.target.to_string(),
        }
    }
}

/// Fields for a new habit, validated before insert.
#[derive(Debug, Clone)]
pub struct HabitDraft {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub frequency: Frequency,
    pub target: u32,
    pub unit: Option<String>,
    pub category_id: Option<i64>,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            color: color.into(),
            icon: None,
            frequency: Frequency::Daily,
            target: 1,
            unit: None,
            category_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_target(self.target)?;
        validate_color(&self.color)
    }
}

/// Partial update; `None` leaves the column untouched and `Some(None)`
/// clears a nullable one.
#[derive(Debug, Clone, Default)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
    pub frequency: Option<Frequency>,
    pub target: Option<u32>,
    pub unit: Option<Option<String>>,
    pub category_id: Option<Option<i64>>,
}

impl HabitChanges {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(target) = self.target {
            validate_target(target)?;
        }
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.icon.is_none()
            && self.frequency.is_none()
            && self.target.is_none()
            && self.unit.is_none()
            && self.category_id.is_none()
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(())
    }
}

pub(crate) fn validate_target(target: u32) -> Result<(), ValidationError> {
    if target == 0 {
        Err(ValidationError::ZeroTarget)
    } else {
        Ok(())
    }
}

pub(crate) fn validate_color(color: &str) -> Result<(), ValidationError> {
    let hex = color.strip_prefix('#').unwrap_or("");
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::BadColor(color.to_string()))
    }
}
