use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

use crate::analytics::{
    bucket_by_month, build_overview, compute_completion, compute_heatmap, compute_streak,
    intensity, week_columns, HabitScope, TimeRange,
};
use crate::cli::args::{CategoryCommands, GoalCommands, HabitFields};
use crate::config::AppConfig;
use crate::db::repository::{CategoryRepo, EntryRepo, GoalRepo, HabitRepo};
use crate::error::ValidationError;
use crate::models::{
    CategoryDraft, Goal, GoalChanges, GoalDraft, Habit, HabitChanges, HabitDraft, StatusFilter,
    StreakStats,
};
use crate::utils::dates::{format_date, parse_date, today};
use crate::utils::format::{fit_width, format_days, hex_to_rgb, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! print_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        print!("\x1b[0m");
    }};
}

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const ACCENT: &str = "\x1b[38;2;99;102;241m";

/// 24-bit foreground escape for a habit colour, plain when unparsable.
fn habit_color(hex: &str) -> String {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m", r, g, b),
        None => String::new(),
    }
}

/// Maps an edit argument to a nullable column change; "none" clears it.
fn clearable(arg: Option<&str>) -> Option<Option<String>> {
    arg.map(|value| {
        let value = value.trim();
        (!value.eq_ignore_ascii_case("none")).then(|| value.to_string())
    })
}

fn resolve_date(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(today()),
    }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn handle_add(
    conn: &Connection,
    config: &AppConfig,
    name: &str,
    fields: &HabitFields,
) -> Result<()> {
    let category_id = match fields.category.as_deref() {
        Some(category) => Some(CategoryRepo::resolve(conn, category)?.id),
        None => None,
    };

    let mut draft = HabitDraft::new(
        name.trim(),
        fields
            .color
            .clone()
            .unwrap_or_else(|| config.display.default_color.clone()),
    );
    draft.description = fields.description.clone();
    draft.icon = fields.icon.clone();
    draft.frequency = fields.frequency.unwrap_or_default();
    draft.target = fields.target.unwrap_or(1);
    draft.unit = fields.unit.clone();
    draft.category_id = category_id;

    let id = HabitRepo::create(conn, &draft)?;
    println_colored!(GREEN, "  ✓ Added habit #{}: {}", id, draft.name);
    Ok(())
}

pub fn handle_list(
    conn: &Connection,
    config: &AppConfig,
    status: StatusFilter,
    search: Option<&str>,
) -> Result<()> {
    let today = today();
    let policy = config.streak.policy();
    let habits: Vec<Habit> = HabitRepo::list_with_entries(conn, status)?
        .into_iter()
        .filter(|h| search.is_none_or(|q| h.matches_search(q)))
        .collect();

    println!();
    if habits.is_empty() {
        println_colored!(DIM, "  No habits found. Add one with `habitrack add <name>`.");
        println!();
        return Ok(());
    }

    println_colored!(ACCENT, "  Habits ({})", habits.len());
    println!();
    for habit in &habits {
        let streak = compute_streak(&habit.entries, today, &policy);
        let mark = if habit.is_completed_on(today) {
            format!("{}✓\x1b[0m", GREEN)
        } else {
            format!("{}○\x1b[0m", DIM)
        };
        let amount = match habit.entry_on(today) {
            Some(entry) if habit.target > 1 => format!("{}/{}", entry.value, habit.target_label()),
            _ => habit.target_label(),
        };
        let category = habit
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("-");

        print!("  {} ", mark);
        print_colored!(habit_color(&habit.color), "●");
        print!(" {:>3}  {}", habit.id, fit_width(&habit.name, 24));
        print!("  {}", fit_width(category, 14));
        print!("  {:<8}  {:<12}", habit.frequency.display_name(), amount);
        if habit.is_active {
            println!("  🔥 {}", format_days(streak.current_streak));
        } else {
            println_colored!(DIM, "  (inactive)");
        }
    }
    println!();
    Ok(())
}

pub fn handle_edit(
    conn: &Connection,
    habit: &str,
    name: Option<&str>,
    fields: &HabitFields,
) -> Result<()> {
    let target = HabitRepo::resolve(conn, habit)?;

    let category_id = match fields.category.as_deref() {
        Some(c) if c.eq_ignore_ascii_case("none") => Some(None),
        Some(c) => Some(Some(CategoryRepo::resolve(conn, c)?.id)),
        None => None,
    };

    let changes = HabitChanges {
        name: name.map(|n| n.trim().to_string()),
        description: clearable(fields.description.as_deref()),
        color: fields.color.clone(),
        icon: clearable(fields.icon.as_deref()),
        frequency: fields.frequency,
        target: fields.target,
        unit: clearable(fields.unit.as_deref()),
        category_id,
    };

    if changes.is_empty() {
        println_colored!(DIM, "  Nothing to change for {}", target.name);
        return Ok(());
    }

    HabitRepo::update(conn, target.id, &changes)?;
    println_colored!(GREEN, "  ✓ Updated {}", changes.name.as_deref().unwrap_or(&target.name));
    Ok(())
}

pub fn handle_set_active(conn: &Connection, habit: &str, active: bool) -> Result<()> {
    let target = HabitRepo::resolve(conn, habit)?;
    HabitRepo::set_active(conn, target.id, active)?;
    if active {
        println_colored!(GREEN, "  ✓ {} is active", target.name);
    } else {
        println_colored!(AMBER, "  {} deactivated; history kept", target.name);
    }
    Ok(())
}

pub fn handle_delete(conn: &Connection, habit: &str) -> Result<()> {
    let target = HabitRepo::resolve(conn, habit)?;
    HabitRepo::delete(conn, target.id)?;
    println_colored!(RED, "  ✗ Deleted {} with its entries and goals", target.name);
    Ok(())
}

// ─── Entries ─────────────────────────────────────────────────────────────────

pub fn handle_done(
    conn: &Connection,
    config: &AppConfig,
    habit: &str,
    date: Option<&str>,
    value: u32,
    note: Option<&str>,
) -> Result<()> {
    if value == 0 {
        bail!("Value must be at least 1; use `habitrack undo` to clear a day");
    }
    let target = HabitRepo::resolve(conn, habit)?;
    let date = resolve_date(date)?;

    EntryRepo::upsert(conn, target.id, date, value, note)?;

    let entries = EntryRepo::for_habit(conn, target.id, None)?;
    let streak = compute_streak(&entries, today(), &config.streak.policy());
    println_colored!(
        GREEN,
        "  ✓ {} logged for {} ({}) — streak: {}",
        target.name,
        format_date(date),
        if target.target > 1 {
            format!("{}/{}", value, target.target_label())
        } else {
            value.to_string()
        },
        format_days(streak.current_streak)
    );
    Ok(())
}

pub fn handle_undo(conn: &Connection, habit: &str, date: Option<&str>) -> Result<()> {
    let target = HabitRepo::resolve(conn, habit)?;
    let date = resolve_date(date)?;

    if EntryRepo::remove(conn, target.id, date)? {
        println_colored!(DIM, "  ○ {} cleared for {}", target.name, format_date(date));
    } else {
        println_colored!(DIM, "  Nothing logged for {} on {}", target.name, format_date(date));
    }
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(
    conn: &Connection,
    config: &AppConfig,
    range: Option<TimeRange>,
    all: bool,
) -> Result<()> {
    let today = today();
    let range = range.unwrap_or(config.analytics.default_range);
    let scope = if all { HabitScope::All } else { config.analytics.scope };

    let habits = HabitRepo::list_with_entries(conn, StatusFilter::All)?;
    let overview = build_overview(&habits, today, scope, &config.streak.policy());

    println!();
    println_colored!(ACCENT, "  Statistics — {}", scope.label());
    println!();
    println!("  Tracked:       {} habits", overview.tracked_habits);
    println_colored!(
        if overview.tracked_habits > 0 && overview.completed_today == overview.tracked_habits {
            GREEN
        } else {
            BOLD
        },
        "  Today:         {}/{}  ({}%)",
        overview.completed_today,
        overview.tracked_habits,
        overview.today_rate
    );
    println!("  Best streak:   {}", format_days(overview.best_streak));
    println!("  Live streaks:  {}", overview.live_streaks);

    if !overview.habits.is_empty() {
        println!();
        println_colored!(DIM, "  {:<24}  {:>8}  {:>8}  {:>5}", "Habit", "Current", "Best", "Rate");
        for summary in &overview.habits {
            print!("  ");
            print_colored!(habit_color(&summary.color), "{}", fit_width(&summary.name, 24));
            println!(
                "  {:>8}  {:>8}  {:>4}%",
                summary.streak.current_streak, summary.streak.max_streak, summary.completion_rate
            );
        }
    }

    let period = range.resolve(today, config.analytics.week_start);
    let points = compute_completion(&habits, period, scope);

    println!();
    println_colored!(ACCENT, "  Completion — {} ({} days)", range.label(), period.len());
    println!();
    if range == TimeRange::Year {
        for bucket in bucket_by_month(&points) {
            println!(
                "  {:<9} {}  {:>3}%",
                bucket.label,
                progress_bar(bucket.completed, bucket.possible, 20),
                bucket.percent()
            );
        }
    } else {
        for point in &points {
            println!(
                "  {}  {}  {}/{}",
                point.label,
                progress_bar(point.completed_count, point.total_habits, 20),
                point.completed_count,
                point.total_habits
            );
        }
    }
    println!();
    Ok(())
}

pub fn handle_heatmap(
    conn: &Connection,
    config: &AppConfig,
    habit: &str,
    end: Option<&str>,
) -> Result<()> {
    let target = HabitRepo::resolve_with_entries(conn, habit)?;
    let end = resolve_date(end)?;
    let week_start = config.analytics.week_start;

    let points = compute_heatmap(&target, end);
    let max = points.iter().map(|p| p.count).max().unwrap_or(0);
    let active_days = points.iter().filter(|p| p.count > 0).count();
    let streak = compute_streak(&target.entries, end, &config.streak.policy());
    let color = habit_color(&target.color);

    println!();
    println_colored!(
        ACCENT,
        "  {} — {} to {}",
        target.name,
        points.first().map(|p| format_date(p.date)).unwrap_or_default(),
        format_date(end)
    );
    println!();

    let columns = week_columns(&points, week_start);
    let mut weekday = week_start.weekday();
    for row in 0..7 {
        print!("  {:<4}", if row % 2 == 1 { weekday.to_string() } else { String::new() });
        weekday = weekday.succ();
        for column in &columns {
            match column[row] {
                None => print!(" "),
                Some(point) => {
                    let glyph = match intensity(point.count, max) {
                        0 => "·",
                        1 => "░",
                        2 => "▒",
                        3 => "▓",
                        _ => "█",
                    };
                    if point.count == 0 {
                        print_colored!(DIM, "{}", glyph);
                    } else {
                        print_colored!(color, "{}", glyph);
                    }
                }
            }
        }
        println!();
    }

    println!();
    println_colored!(
        DIM,
        "  {} active days  ·  current {}  ·  best {}",
        active_days,
        format_days(streak.current_streak),
        format_days(streak.max_streak)
    );
    println!();
    Ok(())
}

// ─── Goals ───────────────────────────────────────────────────────────────────

pub fn handle_goal(conn: &Connection, action: &GoalCommands) -> Result<()> {
    match action {
        GoalCommands::Add {
            habit,
            title,
            target,
            deadline,
            description,
        } => {
            let owner = HabitRepo::resolve(conn, habit)?;
            let deadline = deadline.as_deref().map(parse_date).transpose()?;
            let draft = GoalDraft {
                habit_id: owner.id,
                title: title.trim().to_string(),
                description: description.clone(),
                target: *target,
                deadline,
            };
            let id = GoalRepo::create(conn, &draft)?;
            println_colored!(GREEN, "  ✓ Goal #{} added to {}: {}", id, owner.name, draft.title);
        }
        GoalCommands::List { status } => {
            let goals = GoalRepo::list(conn, *status)?;
            print_goals(&goals);
        }
        GoalCommands::Edit {
            id,
            title,
            description,
            target,
            deadline,
        } => {
            let deadline = match clearable(deadline.as_deref()) {
                Some(Some(raw)) => Some(Some(parse_date(&raw)?)),
                Some(None) => Some(None),
                None => None,
            };
            let changes = GoalChanges {
                title: title.as_deref().map(|t| t.trim().to_string()),
                description: clearable(description.as_deref()),
                target: *target,
                deadline,
            };
            if changes.is_empty() {
                println_colored!(DIM, "  Nothing to change for goal #{}", id);
                return Ok(());
            }
            GoalRepo::update(conn, *id, &changes)?;
            println_colored!(GREEN, "  ✓ Goal #{} updated", id);
        }
        GoalCommands::Complete { id } => {
            let goal = GoalRepo::get(conn, *id)?.ok_or(ValidationError::UnknownGoal(*id))?;
            GoalRepo::set_completed(conn, goal.id, true)?;
            println_colored!(GREEN, "  ✓ Goal #{} achieved: {} ({})", goal.id, goal.title, goal.habit_name);
        }
        GoalCommands::Reopen { id } => {
            GoalRepo::set_completed(conn, *id, false)?;
            println_colored!(AMBER, "  Goal #{} reopened", id);
        }
        GoalCommands::Delete { id } => {
            GoalRepo::delete(conn, *id)?;
            println_colored!(RED, "  ✗ Goal #{} deleted", id);
        }
    }
    Ok(())
}

fn print_goals(goals: &[Goal]) {
    let today = today();
    println!();
    if goals.is_empty() {
        println_colored!(DIM, "  No goals found");
        println!();
        return;
    }

    println_colored!(ACCENT, "  Goals ({})", goals.len());
    println!();
    for goal in goals {
        let deadline = goal.deadline.map(format_date).unwrap_or_else(|| "-".to_string());
        let line = format!(
            "  #{:<3} {}  {}  {} days  due {}",
            goal.id,
            fit_width(&goal.title, 28),
            fit_width(&goal.habit_name, 16),
            goal.target,
            deadline
        );
        if goal.is_completed {
            println_colored!(GREEN, "{}  ✓", line);
        } else if goal.is_overdue(today) {
            println_colored!(RED, "{}  overdue", line);
        } else {
            println!("{}", line);
        }
    }
    println!();
}

// ─── Categories ──────────────────────────────────────────────────────────────

pub fn handle_categories(
    conn: &Connection,
    config: &AppConfig,
    action: Option<&CategoryCommands>,
) -> Result<()> {
    match action {
        None | Some(CategoryCommands::List) => print_categories(conn),
        Some(CategoryCommands::Add {
            name,
            description,
            color,
            icon,
        }) => {
            let draft = CategoryDraft {
                name: name.trim().to_string(),
                description: description.clone(),
                color: color
                    .clone()
                    .unwrap_or_else(|| config.display.default_color.clone()),
                icon: icon.clone(),
            };
            let id = CategoryRepo::create(conn, &draft)?;
            println_colored!(GREEN, "  ✓ Category #{} added: {}", id, draft.name);
            Ok(())
        }
    }
}

fn print_categories(conn: &Connection) -> Result<()> {
    let categories = CategoryRepo::list(conn)?;
    println!();
    println_colored!(ACCENT, "  Categories");
    println!();
    for category in &categories {
        print!("  {} ", category.icon.as_deref().unwrap_or(" "));
        print_colored!(habit_color(&category.color), "{}", fit_width(&category.name, 16));
        println_colored!(DIM, "  {}", category.description.as_deref().unwrap_or(""));
    }
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ExportedHabit {
    #[serde(flatten)]
    habit: Habit,
    streak: StreakStats,
    goals: Vec<Goal>,
}

#[derive(Serialize)]
struct ExportDocument {
    exported_at: String,
    habits: Vec<ExportedHabit>,
}

pub fn handle_export(conn: &Connection, config: &AppConfig) -> Result<()> {
    let today = today();
    let policy = config.streak.policy();

    let mut habits = Vec::new();
    for habit in HabitRepo::list_with_entries(conn, StatusFilter::All)? {
        let goals = GoalRepo::list_for_habit(conn, habit.id)?;
        let streak = compute_streak(&habit.entries, today, &policy);
        habits.push(ExportedHabit { habit, streak, goals });
    }

    let document = ExportDocument {
        exported_at: Local::now().to_rfc3339(),
        habits,
    };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init {
        config.save()?;
        println_colored!(GREEN, "  ✓ Wrote {}", path.display());
    } else if !path.exists() {
        println_colored!(DIM, "  {} (not created, using defaults)", path.display());
    } else {
        println_colored!(DIM, "  {}", path.display());
    }
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_keyword_clears_and_other_text_sets() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some("None")), Some(None));
        assert_eq!(clearable(Some(" km ")), Some(Some("km".to_string())));
    }
}
