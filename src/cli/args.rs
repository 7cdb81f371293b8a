use clap::{Args, Parser, Subcommand};

use crate::analytics::TimeRange;
use crate::models::{Frequency, GoalFilter, StatusFilter};

#[derive(Parser, Debug)]
#[command(name = "habitrack", version, author, about = "Track habits, streaks and goals from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        #[command(flatten)]
        fields: HabitFields,
    },
    /// List habits with streaks and today's status
    List {
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        /// Filter by name, description or category
        #[arg(long)]
        search: Option<String>,
    },
    /// Change a habit's details
    Edit {
        /// Habit name or id
        habit: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: HabitFields,
    },
    /// Log a completion (updates the day's entry if one exists)
    Done {
        /// Habit name or id
        habit: String,
        /// Day to log, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Amount achieved
        #[arg(long, default_value_t = 1)]
        value: u32,
        #[arg(long)]
        note: Option<String>,
    },
    /// Remove a day's entry
    Undo {
        /// Habit name or id
        habit: String,
        /// Day to clear, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a habit active again
    Activate {
        /// Habit name or id
        habit: String,
    },
    /// Hide a habit from active tracking without deleting its history
    Deactivate {
        /// Habit name or id
        habit: String,
    },
    /// Delete a habit with all its entries and goals
    Delete {
        /// Habit name or id
        habit: String,
    },
    /// Show streaks and completion trends
    Stats {
        /// Period for the completion trend (default from config)
        #[arg(long, value_enum)]
        range: Option<TimeRange>,
        /// Count inactive habits too
        #[arg(long)]
        all: bool,
    },
    /// Show a habit's activity over the last year
    Heatmap {
        /// Habit name or id
        habit: String,
        /// Last day of the window, YYYY-MM-DD (default: today)
        #[arg(long)]
        end: Option<String>,
    },
    /// Goal management
    Goal {
        #[command(subcommand)]
        action: GoalCommands,
    },
    /// List or add habit categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoryCommands>,
    },
    /// Export habits, entries and goals as JSON to stdout
    Export,
    /// Show the config file location and current settings
    Config {
        /// Write the current settings, defaults included, to the config file
        #[arg(long)]
        init: bool,
    },
}

/// Optional habit attributes shared by `add` and `edit`. On edit, "none"
/// clears the description, icon, unit or category.
#[derive(Args, Debug, Default)]
pub struct HabitFields {
    #[arg(long)]
    pub description: Option<String>,
    /// Colour as #rrggbb (new habits default to the configured colour)
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
    /// How often the habit is due (new habits default to daily)
    #[arg(long, value_enum)]
    pub frequency: Option<Frequency>,
    /// Target amount per day (new habits default to 1)
    #[arg(long)]
    pub target: Option<u32>,
    /// Unit for the target, e.g. "glasses"
    #[arg(long)]
    pub unit: Option<String>,
    /// Category name (see `habitrack categories`); "none" clears it on edit
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Create a goal for a habit
    Add {
        /// Habit name or id
        habit: String,
        /// Goal title
        title: String,
        /// Target in days
        #[arg(long, default_value_t = 7)]
        target: u32,
        /// Deadline, YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List goals
    List {
        #[arg(long, value_enum, default_value_t = GoalFilter::All)]
        status: GoalFilter,
    },
    /// Change a goal's title, description, target or deadline
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        /// "none" clears it
        #[arg(long)]
        description: Option<String>,
        /// Target in days
        #[arg(long)]
        target: Option<u32>,
        /// Deadline, YYYY-MM-DD; "none" clears it
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Mark a goal as achieved
    Complete {
        id: i64,
    },
    /// Mark a goal as not achieved
    Reopen {
        id: i64,
    },
    /// Delete a goal
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories (the default)
    List,
    /// Create a category
    Add {
        /// Category name
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Colour as #rrggbb (default: the configured colour)
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
}
