mod analytics;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    debug!("Opened database at {:?}", db_path);

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Add { name, fields }) => {
            handlers::handle_add(&conn, &config, &name, &fields)?;
        }
        Some(Commands::List { status, search }) => {
            handlers::handle_list(&conn, &config, status, search.as_deref())?;
        }
        Some(Commands::Edit { habit, name, fields }) => {
            handlers::handle_edit(&conn, &habit, name.as_deref(), &fields)?;
        }
        Some(Commands::Done { habit, date, value, note }) => {
            handlers::handle_done(&conn, &config, &habit, date.as_deref(), value, note.as_deref())?;
        }
        Some(Commands::Undo { habit, date }) => {
            handlers::handle_undo(&conn, &habit, date.as_deref())?;
        }
        Some(Commands::Activate { habit }) => {
            handlers::handle_set_active(&conn, &habit, true)?;
        }
        Some(Commands::Deactivate { habit }) => {
            handlers::handle_set_active(&conn, &habit, false)?;
        }
        Some(Commands::Delete { habit }) => {
            handlers::handle_delete(&conn, &habit)?;
        }
        Some(Commands::Stats { range, all }) => {
            handlers::handle_stats(&conn, &config, range, all)?;
        }
        Some(Commands::Heatmap { habit, end }) => {
            handlers::handle_heatmap(&conn, &config, &habit, end.as_deref())?;
        }
        Some(Commands::Goal { action }) => {
            handlers::handle_goal(&conn, &action)?;
        }
        Some(Commands::Categories { action }) => {
            handlers::handle_categories(&conn, &config, action.as_ref())?;
        }
        Some(Commands::Export) => {
            handlers::handle_export(&conn, &config)?;
        }
        Some(Commands::Config { init }) => {
            handlers::handle_config(&config, init)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}
