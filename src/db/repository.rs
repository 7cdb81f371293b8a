use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::str::FromStr;

use crate::analytics::DateRange;
use crate::error::ValidationError;
use crate::models::{
    Category, CategoryDraft, Frequency, Goal, GoalChanges, GoalDraft, GoalFilter, Habit,
    HabitChanges, HabitDraft, HabitEntry, StatusFilter,
};
use crate::utils::dates::{format_date, parse_date};

fn stored_date(raw: &str, what: &str) -> Option<NaiveDate> {
    match parse_date(raw) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Skipping {} with unreadable date: {}", what, e);
            None
        }
    }
}

// ─── Categories ──────────────────────────────────────────────────────────────

pub struct CategoryRepo;

impl CategoryRepo {
    pub fn list(conn: &Connection) -> Result<Vec<Category>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, color, icon FROM categories ORDER BY name",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                color: row.get(3)?,
                icon: row.get(4)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
        conn.query_row(
            "SELECT id, name, description, color, icon FROM categories
             WHERE name = ?1 COLLATE NOCASE",
            params![name.trim()],
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    color: row.get(3)?,
                    icon: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    /// Inserts a category. Names are unique ignoring case.
    pub fn create(conn: &Connection, draft: &CategoryDraft) -> Result<i64> {
        draft.validate()?;
        let name = draft.name.trim();
        if Self::find_by_name(conn, name)?.is_some() {
            return Err(ValidationError::DuplicateCategory(name.to_string()).into());
        }

        let inserted = conn.execute(
            "INSERT INTO categories (name, description, color, icon) VALUES (?1, ?2, ?3, ?4)",
            params![name, draft.description, draft.color, draft.icon],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(ValidationError::DuplicateCategory(name.to_string()).into());
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        info!("Created category {} ({})", id, name);
        Ok(id)
    }

    pub fn resolve(conn: &Connection, name: &str) -> Result<Category> {
        Self::find_by_name(conn, name)?
            .ok_or_else(|| ValidationError::UnknownCategory(name.to_string()).into())
    }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

const HABIT_SELECT: &str = "
    SELECT h.id, h.name, h.description, h.color, h.icon, h.frequency, h.target,
           h.unit, h.is_active, h.created_at,
           c.id, c.name, c.description, c.color, c.icon
    FROM habits h
    LEFT JOIN categories c ON c.id = h.category_id";

fn habit_from_row(row: &Row) -> rusqlite::Result<Habit> {
    let frequency: String = row.get(5)?;
    let category = match row.get::<_, Option<i64>>(10)? {
        Some(id) => Some(Category {
            id,
            name: row.get(11)?,
            description: row.get(12)?,
            color: row.get(13)?,
            icon: row.get(14)?,
        }),
        None => None,
    };

    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
        frequency: Frequency::from_str(&frequency)
            .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?,
        target: row.get(6)?,
        unit: row.get(7)?,
        is_active: row.get::<_, i32>(8)? != 0,
        created_at: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        category,
        entries: Vec::new(),
    })
}

pub struct HabitRepo;

impl HabitRepo {
    pub fn create(conn: &Connection, draft: &HabitDraft) -> Result<i64> {
        draft.validate()?;
        conn.execute(
            "INSERT INTO habits (name, description, color, icon, frequency, target, unit, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                draft.name.trim(),
                draft.description,
                draft.color,
                draft.icon,
                draft.frequency.as_str(),
                draft.target,
                draft.unit,
                draft.category_id,
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!("Created habit {} ({})", id, draft.name.trim());
        Ok(id)
    }

    /// Habits without entries, newest first.
    pub fn list(conn: &Connection, filter: StatusFilter) -> Result<Vec<Habit>> {
        let sql = format!("{} ORDER BY h.created_at DESC, h.id DESC", HABIT_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], habit_from_row)?;

        let mut result = Vec::new();
        for r in rows {
            let habit = r?;
            if filter.matches(&habit) {
                result.push(habit);
            }
        }
        Ok(result)
    }

    /// Habits with their full entry history attached.
    pub fn list_with_entries(conn: &Connection, filter: StatusFilter) -> Result<Vec<Habit>> {
        let mut habits = Self::list(conn, filter)?;
        let mut grouped = EntryRepo::all_by_habit(conn)?;
        for habit in &mut habits {
            habit.entries = grouped.remove(&habit.id).unwrap_or_default();
        }
        debug!("Loaded {} habits with entries", habits.len());
        Ok(habits)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<Habit>> {
        let sql = format!("{} WHERE h.id = ?1", HABIT_SELECT);
        conn.query_row(&sql, params![id], habit_from_row)
            .optional()
            .map_err(anyhow::Error::from)
    }

    /// Look a habit up by numeric id, then by case-insensitive name.
    pub fn find(conn: &Connection, query: &str) -> Result<Option<Habit>> {
        let query = query.trim();
        if let Ok(id) = query.parse::<i64>() {
            if let Some(habit) = Self::get(conn, id)? {
                return Ok(Some(habit));
            }
        }

        let sql = format!(
            "{} WHERE h.name = ?1 COLLATE NOCASE ORDER BY h.is_active DESC, h.id LIMIT 1",
            HABIT_SELECT
        );
        conn.query_row(&sql, params![query], habit_from_row)
            .optional()
            .map_err(anyhow::Error::from)
    }

    /// Like `find`, but a miss is a `ValidationError::UnknownHabit`.
    pub fn resolve(conn: &Connection, query: &str) -> Result<Habit> {
        Self::find(conn, query)?
            .ok_or_else(|| ValidationError::UnknownHabit(query.to_string()).into())
    }

    /// Like `resolve`, with the entry history attached.
    pub fn resolve_with_entries(conn: &Connection, query: &str) -> Result<Habit> {
        let mut habit = Self::resolve(conn, query)?;
        habit.entries = EntryRepo::for_habit(conn, habit.id, None)?;
        Ok(habit)
    }

    pub fn update(conn: &Connection, id: i64, changes: &HabitChanges) -> Result<()> {
        changes.validate()?;
        let updated = conn.execute(
            "UPDATE habits SET
                name        = COALESCE(?1, name),
                description = CASE WHEN ?2 THEN ?3 ELSE description END,
                color       = COALESCE(?4, color),
                icon        = CASE WHEN ?5 THEN ?6 ELSE icon END,
                frequency   = COALESCE(?7, frequency),
                target      = COALESCE(?8, target),
                unit        = CASE WHEN ?9 THEN ?10 ELSE unit END
             WHERE id = ?11",
            params![
                changes.name.as_deref().map(str::trim),
                changes.description.is_some(),
                changes.description.clone().flatten(),
                changes.color,
                changes.icon.is_some(),
                changes.icon.clone().flatten(),
                changes.frequency.map(|f| f.as_str()),
                changes.target,
                changes.unit.is_some(),
                changes.unit.clone().flatten(),
                id,
            ],
        )?;
        if updated == 0 {
            return Err(ValidationError::UnknownHabit(id.to_string()).into());
        }

        if let Some(category_id) = changes.category_id {
            conn.execute(
                "UPDATE habits SET category_id = ?1 WHERE id = ?2",
                params![category_id, id],
            )?;
        }
        info!("Updated habit {}", id);
        Ok(())
    }

    pub fn set_active(conn: &Connection, id: i64, active: bool) -> Result<()> {
        let updated = conn.execute(
            "UPDATE habits SET is_active = ?1 WHERE id = ?2",
            params![active as i32, id],
        )?;
        if updated == 0 {
            return Err(ValidationError::UnknownHabit(id.to_string()).into());
        }
        info!("Habit {} is now {}", id, if active { "active" } else { "inactive" });
        Ok(())
    }

    /// Removes the habit together with its entries and goals.
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let deleted = conn.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(ValidationError::UnknownHabit(id.to_string()).into());
        }
        info!("Deleted habit {}", id);
        Ok(())
    }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

pub struct EntryRepo;

impl EntryRepo {
    /// Insert or replace the entry for (habit, date). Notes are kept when
    /// `notes` is `None`.
    pub fn upsert(
        conn: &Connection,
        habit_id: i64,
        date: NaiveDate,
        value: u32,
        notes: Option<&str>,
    ) -> Result<()> {
        conn.execute(
            "INSERT INTO habit_entries (habit_id, date, value, notes)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(habit_id, date) DO UPDATE SET value = ?3, notes = COALESCE(?4, notes)",
            params![habit_id, format_date(date), value, notes],
        )?;
        info!("Logged habit {} on {} (value {})", habit_id, date, value);
        Ok(())
    }

    pub fn remove(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<bool> {
        let deleted = conn.execute(
            "DELETE FROM habit_entries WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, format_date(date)],
        )?;
        Ok(deleted > 0)
    }

    /// Flip completion for a day. Returns whether the day is now completed.
    pub fn toggle(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<bool> {
        let current: Option<u32> = conn
            .query_row(
                "SELECT value FROM habit_entries WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, format_date(date)],
                |row| row.get(0),
            )
            .optional()?;

        match current {
            Some(value) if value > 0 => {
                Self::remove(conn, habit_id, date)?;
                info!("Cleared habit {} on {}", habit_id, date);
                Ok(false)
            }
            _ => {
                Self::upsert(conn, habit_id, date, 1, None)?;
                Ok(true)
            }
        }
    }

    /// Entries for one habit, newest first, optionally limited to `range`.
    pub fn for_habit(
        conn: &Connection,
        habit_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<HabitEntry>> {
        let (start, end) = match range {
            Some(r) => (format_date(r.start), format_date(r.end)),
            None => ("0000-01-01".to_string(), "9999-12-31".to_string()),
        };

        let mut stmt = conn.prepare(
            "SELECT id, date, value, notes FROM habit_entries
             WHERE habit_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date DESC",
        )?;

        let rows = stmt.query_map(params![habit_id, start, end], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, date, value, notes) = r?;
            if let Some(date) = stored_date(&date, "entry") {
                result.push(HabitEntry {
                    id: Some(id),
                    date,
                    value,
                    notes,
                });
            }
        }
        Ok(result)
    }

    fn all_by_habit(conn: &Connection) -> Result<HashMap<i64, Vec<HabitEntry>>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, date, value, notes FROM habit_entries ORDER BY date DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut grouped: HashMap<i64, Vec<HabitEntry>> = HashMap::new();
        for r in rows {
            let (id, habit_id, date, value, notes) = r?;
            if let Some(date) = stored_date(&date, "entry") {
                grouped.entry(habit_id).or_default().push(HabitEntry {
                    id: Some(id),
                    date,
                    value,
                    notes,
                });
            }
        }
        Ok(grouped)
    }
}

// ─── Goals ───────────────────────────────────────────────────────────────────

const GOAL_SELECT: &str = "
    SELECT g.id, g.habit_id, h.name, h.color, g.title, g.description, g.target,
           g.deadline, g.is_completed, g.created_at
    FROM goals g
    JOIN habits h ON h.id = g.habit_id";

fn goal_from_row(row: &Row) -> rusqlite::Result<Goal> {
    let deadline: Option<String> = row.get(7)?;
    Ok(Goal {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        habit_name: row.get(2)?,
        habit_color: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        target: row.get(6)?,
        deadline: deadline.as_deref().and_then(|d| stored_date(d, "goal deadline")),
        is_completed: row.get::<_, i32>(8)? != 0,
        created_at: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
    })
}

pub struct GoalRepo;

impl GoalRepo {
    pub fn create(conn: &Connection, draft: &GoalDraft) -> Result<i64> {
        draft.validate()?;
        conn.execute(
            "INSERT INTO goals (habit_id, title, description, target, deadline)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.habit_id,
                draft.title.trim(),
                draft.description,
                draft.target,
                draft.deadline.map(format_date),
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!("Created goal {} for habit {}", id, draft.habit_id);
        Ok(id)
    }

    pub fn update(conn: &Connection, id: i64, changes: &GoalChanges) -> Result<()> {
        changes.validate()?;
        let updated = conn.execute(
            "UPDATE goals SET
                title       = COALESCE(?1, title),
                description = CASE WHEN ?2 THEN ?3 ELSE description END,
                target      = COALESCE(?4, target),
                deadline    = CASE WHEN ?5 THEN ?6 ELSE deadline END
             WHERE id = ?7",
            params![
                changes.title.as_deref().map(str::trim),
                changes.description.is_some(),
                changes.description.clone().flatten(),
                changes.target,
                changes.deadline.is_some(),
                changes.deadline.flatten().map(format_date),
                id,
            ],
        )?;
        if updated == 0 {
            return Err(ValidationError::UnknownGoal(id).into());
        }
        info!("Updated goal {}", id);
        Ok(())
    }

    /// Goals newest first.
    pub fn list(conn: &Connection, filter: GoalFilter) -> Result<Vec<Goal>> {
        let sql = format!("{} ORDER BY g.created_at DESC, g.id DESC", GOAL_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], goal_from_row)?;

        let mut result = Vec::new();
        for r in rows {
            let goal = r?;
            if filter.matches(&goal) {
                result.push(goal);
            }
        }
        Ok(result)
    }

    pub fn list_for_habit(conn: &Connection, habit_id: i64) -> Result<Vec<Goal>> {
        let sql = format!("{} WHERE g.habit_id = ?1 ORDER BY g.id", GOAL_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![habit_id], goal_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<Goal>> {
        let sql = format!("{} WHERE g.id = ?1", GOAL_SELECT);
        conn.query_row(&sql, params![id], goal_from_row)
            .optional()
            .map_err(anyhow::Error::from)
    }

    pub fn set_completed(conn: &Connection, id: i64, completed: bool) -> Result<()> {
        let updated = conn.execute(
            "UPDATE goals SET is_completed = ?1 WHERE id = ?2",
            params![completed as i32, id],
        )?;
        if updated == 0 {
            return Err(ValidationError::UnknownGoal(id).into());
        }
        info!("Goal {} completed = {}", id, completed);
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let deleted = conn.execute("DELETE FROM goals WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(ValidationError::UnknownGoal(id).into());
        }
        info!("Deleted goal {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn add(conn: &Connection, name: &str) -> i64 {
        HabitRepo::create(conn, &HabitDraft::new(name, "#6366f1")).unwrap()
    }

    #[test]
    fn creates_and_finds_habits_by_name_or_id() {
        let conn = conn();
        let mut draft = HabitDraft::new("Morning Run", "#10b981");
        draft.category_id = Some(CategoryRepo::resolve(&conn, "health & fitness").unwrap().id);
        draft.unit = Some("km".to_string());
        draft.target = 5;
        let id = HabitRepo::create(&conn, &draft).unwrap();

        let by_name = HabitRepo::find(&conn, "morning run").unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert_eq!(by_name.target_label(), "5 km");
        assert_eq!(by_name.category.map(|c| c.name).as_deref(), Some("Health & Fitness"));

        let by_id = HabitRepo::find(&conn, &id.to_string()).unwrap().unwrap();
        assert_eq!(by_id.name, "Morning Run");
        assert!(HabitRepo::find(&conn, "swim").unwrap().is_none());
    }

    #[test]
    fn rejects_invalid_drafts_before_insert() {
        let conn = conn();
        let err = HabitRepo::create(&conn, &HabitDraft::new("", "#6366f1")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::EmptyName)
        );
        assert!(HabitRepo::list(&conn, StatusFilter::All).unwrap().is_empty());
    }

    #[test]
    fn upsert_keeps_one_row_per_day() {
        let conn = conn();
        let id = add(&conn, "Water");
        EntryRepo::upsert(&conn, id, d(1, 1), 3, Some("after lunch")).unwrap();
        EntryRepo::upsert(&conn, id, d(1, 1), 5, None).unwrap();

        let entries = EntryRepo::for_habit(&conn, id, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, 5);
        assert_eq!(entries[0].notes.as_deref(), Some("after lunch"));
    }

    #[test]
    fn toggle_flips_completion() {
        let conn = conn();
        let id = add(&conn, "Read");
        assert!(EntryRepo::toggle(&conn, id, d(2, 1)).unwrap());
        assert!(!EntryRepo::toggle(&conn, id, d(2, 1)).unwrap());
        assert!(EntryRepo::for_habit(&conn, id, None).unwrap().is_empty());

        EntryRepo::upsert(&conn, id, d(2, 2), 0, None).unwrap();
        assert!(EntryRepo::toggle(&conn, id, d(2, 2)).unwrap());
    }

    #[test]
    fn entries_can_be_limited_to_a_range() {
        let conn = conn();
        let id = add(&conn, "Read");
        for day in 1..=10 {
            EntryRepo::upsert(&conn, id, d(3, day), 1, None).unwrap();
        }
        let range = DateRange::new(d(3, 3), d(3, 5));
        let entries = EntryRepo::for_habit(&conn, id, Some(range)).unwrap();
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![d(3, 5), d(3, 4), d(3, 3)]);
    }

    #[test]
    fn list_with_entries_attaches_each_habits_history() {
        let conn = conn();
        let a = add(&conn, "A");
        let b = add(&conn, "B");
        EntryRepo::upsert(&conn, a, d(4, 1), 1, None).unwrap();
        EntryRepo::upsert(&conn, a, d(4, 2), 1, None).unwrap();
        EntryRepo::upsert(&conn, b, d(4, 2), 1, None).unwrap();
        HabitRepo::set_active(&conn, b, false).unwrap();

        let all = HabitRepo::list_with_entries(&conn, StatusFilter::All).unwrap();
        let counts: HashMap<i64, usize> = all.iter().map(|h| (h.id, h.entries.len())).collect();
        assert_eq!(counts[&a], 2);
        assert_eq!(counts[&b], 1);

        let active = HabitRepo::list_with_entries(&conn, StatusFilter::Active).unwrap();
        assert_eq!(active.len(), 1);
        let inactive = HabitRepo::list(&conn, StatusFilter::Inactive).unwrap();
        assert_eq!(inactive[0].id, b);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let conn = conn();
        let id = add(&conn, "Journal");
        let changes = HabitChanges {
            target: Some(3),
            category_id: Some(Some(CategoryRepo::resolve(&conn, "Wellness").unwrap().id)),
            ..Default::default()
        };
        HabitRepo::update(&conn, id, &changes).unwrap();

        let habit = HabitRepo::get(&conn, id).unwrap().unwrap();
        assert_eq!(habit.name, "Journal");
        assert_eq!(habit.target, 3);
        assert_eq!(habit.category.map(|c| c.name).as_deref(), Some("Wellness"));

        let clear = HabitChanges {
            category_id: Some(None),
            ..Default::default()
        };
        HabitRepo::update(&conn, id, &clear).unwrap();
        assert!(HabitRepo::get(&conn, id).unwrap().unwrap().category.is_none());
    }

    #[test]
    fn update_clears_optional_text_fields() {
        let conn = conn();
        let id = add(&conn, "Run");
        let set = HabitChanges {
            description: Some(Some("Morning loop".to_string())),
            icon: Some(Some("🏃".to_string())),
            unit: Some(Some("km".to_string())),
            ..Default::default()
        };
        HabitRepo::update(&conn, id, &set).unwrap();
        let habit = HabitRepo::get(&conn, id).unwrap().unwrap();
        assert_eq!(habit.description.as_deref(), Some("Morning loop"));
        assert_eq!(habit.unit.as_deref(), Some("km"));

        let clear = HabitChanges {
            description: Some(None),
            unit: Some(None),
            ..Default::default()
        };
        HabitRepo::update(&conn, id, &clear).unwrap();
        let habit = HabitRepo::get(&conn, id).unwrap().unwrap();
        assert!(habit.description.is_none());
        assert!(habit.unit.is_none());
        assert_eq!(habit.icon.as_deref(), Some("🏃"));
    }

    #[test]
    fn deleting_a_habit_cascades() {
        let conn = conn();
        let id = add(&conn, "Meditate");
        EntryRepo::upsert(&conn, id, d(5, 1), 1, None).unwrap();
        let draft = GoalDraft {
            habit_id: id,
            title: "Ten days".to_string(),
            description: None,
            target: 10,
            deadline: None,
        };
        GoalRepo::create(&conn, &draft).unwrap();

        HabitRepo::delete(&conn, id).unwrap();
        let entries: i64 = conn
            .query_row("SELECT COUNT(*) FROM habit_entries", [], |row| row.get(0))
            .unwrap();
        assert_eq!(entries, 0);
        assert!(GoalRepo::list(&conn, GoalFilter::All).unwrap().is_empty());
        assert!(HabitRepo::delete(&conn, id).is_err());
    }

    #[test]
    fn goals_round_trip_with_filters() {
        let conn = conn();
        let id = add(&conn, "Walk");
        let draft = GoalDraft {
            habit_id: id,
            title: "Walk every day in June".to_string(),
            description: Some("10k steps".to_string()),
            target: 30,
            deadline: Some(d(6, 30)),
        };
        let goal_id = GoalRepo::create(&conn, &draft).unwrap();

        let goal = GoalRepo::get(&conn, goal_id).unwrap().unwrap();
        assert_eq!(goal.habit_name, "Walk");
        assert_eq!(goal.deadline, Some(d(6, 30)));
        assert!(goal.is_overdue(d(7, 1)));

        GoalRepo::set_completed(&conn, goal_id, true).unwrap();
        assert_eq!(GoalRepo::list(&conn, GoalFilter::Completed).unwrap().len(), 1);
        assert!(GoalRepo::list(&conn, GoalFilter::Active).unwrap().is_empty());

        let err = GoalRepo::delete(&conn, goal_id + 1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::UnknownGoal(goal_id + 1))
        );
    }

    #[test]
    fn goal_edit_changes_and_clears_fields() {
        let conn = conn();
        let id = add(&conn, "Stretch");
        let draft = GoalDraft {
            habit_id: id,
            title: "Stretch daily".to_string(),
            description: Some("Ten minutes".to_string()),
            target: 14,
            deadline: Some(d(3, 1)),
        };
        let goal_id = GoalRepo::create(&conn, &draft).unwrap();

        let changes = GoalChanges {
            title: Some(" Stretch every day ".to_string()),
            target: Some(21),
            deadline: Some(Some(d(4, 1))),
            ..Default::default()
        };
        GoalRepo::update(&conn, goal_id, &changes).unwrap();
        let goal = GoalRepo::get(&conn, goal_id).unwrap().unwrap();
        assert_eq!(goal.title, "Stretch every day");
        assert_eq!(goal.target, 21);
        assert_eq!(goal.deadline, Some(d(4, 1)));
        assert_eq!(goal.description.as_deref(), Some("Ten minutes"));

        let clear = GoalChanges {
            description: Some(None),
            deadline: Some(None),
            ..Default::default()
        };
        GoalRepo::update(&conn, goal_id, &clear).unwrap();
        let goal = GoalRepo::get(&conn, goal_id).unwrap().unwrap();
        assert!(goal.description.is_none());
        assert!(goal.deadline.is_none());
        assert_eq!(goal.target, 21);

        let err = GoalRepo::update(&conn, goal_id + 1, &changes).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::UnknownGoal(goal_id + 1))
        );
    }

    #[test]
    fn category_create_rejects_duplicate_names() {
        let conn = conn();
        let draft = CategoryDraft {
            name: "Reading".to_string(),
            description: Some("Books and articles".to_string()),
            color: "#0ea5e9".to_string(),
            icon: Some("📚".to_string()),
        };
        let id = CategoryRepo::create(&conn, &draft).unwrap();
        let stored = CategoryRepo::resolve(&conn, "reading").unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.color, "#0ea5e9");
        assert_eq!(CategoryRepo::list(&conn).unwrap().len(), 6);

        for name in ["Reading", "READING "] {
            let dup = CategoryDraft {
                name: name.to_string(),
                ..draft.clone()
            };
            let err = CategoryRepo::create(&conn, &dup).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ValidationError>(),
                Some(ValidationError::DuplicateCategory(_))
            ));
        }

        let bad = CategoryDraft {
            name: "Music".to_string(),
            color: "blue".to_string(),
            ..draft
        };
        assert!(CategoryRepo::create(&conn, &bad).is_err());
        assert_eq!(CategoryRepo::list(&conn).unwrap().len(), 6);
    }

    #[test]
    fn unknown_category_is_a_validation_error() {
        let conn = conn();
        let err = CategoryRepo::resolve(&conn, "Gardening").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::UnknownCategory(_))
        ));
        assert_eq!(CategoryRepo::list(&conn).unwrap().len(), 5);
    }
}
