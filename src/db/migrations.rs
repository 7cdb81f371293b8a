use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS categories (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL UNIQUE,
            description  TEXT,
            color        TEXT NOT NULL DEFAULT '#6366f1',
            icon         TEXT
        );

        CREATE TABLE IF NOT EXISTS habits (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL,
            description  TEXT,
            color        TEXT NOT NULL DEFAULT '#6366f1',
            icon         TEXT,
            frequency    TEXT NOT NULL DEFAULT 'daily'
                         CHECK(frequency IN ('daily','weekly','monthly','custom')),
            target       INTEGER NOT NULL DEFAULT 1 CHECK(target >= 1),
            unit         TEXT,
            category_id  INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            is_active    INTEGER NOT NULL DEFAULT 1,
            created_at   TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS habit_entries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id    INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            date        TEXT NOT NULL,
            value       INTEGER NOT NULL DEFAULT 1 CHECK(value >= 0),
            notes       TEXT,
            created_at  TEXT DEFAULT (datetime('now')),
            UNIQUE(habit_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_habit_entries_date ON habit_entries(date);

        CREATE TABLE IF NOT EXISTS goals (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id      INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            title         TEXT NOT NULL,
            description   TEXT,
            target        INTEGER NOT NULL DEFAULT 7 CHECK(target >= 1),
            deadline      TEXT,
            is_completed  INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT DEFAULT (datetime('now'))
        );
    ")?;

    seed_categories(conn)?;
    Ok(())
}

fn seed_categories(conn: &Connection) -> Result<()> {
    let defaults = [
        ("Health & Fitness", "Physical health and exercise related habits", "#10b981", "💪"),
        ("Learning", "Educational and skill development habits", "#3b82f6", "📚"),
        ("Productivity", "Work and productivity related habits", "#6366f1", "⚡"),
        ("Wellness", "Mental health and wellbeing habits", "#8b5cf6", "🧘"),
        ("Social", "Relationships and social habits", "#ec4899", "👥"),
    ];

    for (name, description, color, icon) in &defaults {
        conn.execute(
            "INSERT OR IGNORE INTO categories (name, description, color, icon)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![name, description, color, icon],
        )?;
    }
    Ok(())
}
