use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::analytics::{
    build_overview, compute_completion, compute_heatmap, HabitScope, HabitSummary, Overview,
    TimeRange,
};
use crate::config::AppConfig;
use crate::db::repository::{EntryRepo, HabitRepo};
use crate::models::{CompletionPoint, Habit, HeatmapPoint, StatusFilter};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{habits, header, heatmap, statusbar, streak, trend};
use crate::utils::dates::today;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Heatmap,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    EntryInput,
}

/// Ticks a status message stays visible.
const MESSAGE_TICKS: u8 = 6;

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,
    pub message: Option<String>,
    message_ticks: u8,

    pub selected: usize,
    pub range: TimeRange,
    pub scope: HabitScope,

    // Cached state (refreshed on load/action)
    pub today: NaiveDate,
    pub habits: Vec<Habit>,
    pub overview: Overview,
    pub trend: Vec<CompletionPoint>,
    pub heatmap: Vec<HeatmapPoint>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let today = today();
        let range = config.analytics.default_range;
        let scope = config.analytics.scope;
        let overview = build_overview(&[], today, scope, &config.streak.policy());

        App {
            view: View::Dashboard,
            config,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            message: None,
            message_ticks: 0,
            selected: 0,
            range,
            scope,
            today,
            habits: Vec::new(),
            overview,
            trend: Vec::new(),
            heatmap: Vec::new(),
        }
    }

    /// Reload every habit with its entries and rebuild the derived numbers.
    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        self.today = today();
        self.habits = HabitRepo::list_with_entries(conn, StatusFilter::All)?;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        let policy = self.config.streak.policy();
        self.overview = build_overview(&self.habits, self.today, self.scope, &policy);
        self.selected = self
            .selected
            .min(self.overview.habits.len().saturating_sub(1));

        let period = self.range.resolve(self.today, self.config.analytics.week_start);
        self.trend = compute_completion(&self.habits, period, self.scope);

        self.heatmap = match self.selected_habit() {
            Some(habit) => compute_heatmap(habit, self.today),
            None => Vec::new(),
        };
        debug!(
            "Recomputed dashboard: {} habits, range {}, scope {}",
            self.overview.habits.len(),
            self.range,
            self.scope.label()
        );
    }

    pub fn selected_summary(&self) -> Option<&HabitSummary> {
        self.overview.habits.get(self.selected)
    }

    fn selected_habit(&self) -> Option<&Habit> {
        let id = self.selected_summary()?.id;
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn tick(&mut self, conn: &Connection) {
        if self.message_ticks > 0 {
            self.message_ticks -= 1;
            if self.message_ticks == 0 {
                self.message = None;
            }
        }

        // Streaks are relative to today; pick up the date rolling over.
        if today() != self.today {
            self.reload(conn);
        }
    }

    fn reload(&mut self, conn: &Connection) {
        if let Err(e) = self.load(conn) {
            warn!("Reload failed: {:#}", e);
            self.flash(format!("✗ {}", e));
        }
    }

    fn flash(&mut self, message: String) {
        self.message = Some(message);
        self.message_ticks = MESSAGE_TICKS;
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Only handle actual key presses — ignore release/repeat events from some terminals
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::EntryInput => self.handle_entry_input(key, conn),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key, conn),
                View::Heatmap => self.handle_heatmap_key(key),
                View::Help => self.handle_help_key(key),
            },
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('h') => {
                self.view = View::Heatmap;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(conn),
            KeyCode::Char('n') => {
                if self.selected_summary().is_some() {
                    self.input_mode = InputMode::EntryInput;
                    self.input_buffer.clear();
                    self.input_error = None;
                }
            }
            KeyCode::Char('r') => {
                self.range = self.range.next();
                self.recompute();
            }
            KeyCode::Char('a') => {
                self.scope = self.scope.toggled();
                self.selected = 0;
                self.recompute();
            }
            _ => {}
        }
    }

    fn handle_heatmap_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('h') => {
                self.view = View::Dashboard;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') => {
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_entry_input(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => match parse_entry_input(&self.input_buffer) {
                Ok((value, note)) => {
                    self.log_selected(conn, value, note.as_deref());
                    self.input_mode = InputMode::Normal;
                    self.input_buffer.clear();
                    self.input_error = None;
                }
                Err(e) => self.input_error = Some(e),
            },
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let len = self.overview.habits.len();
        if len == 0 {
            return;
        }
        let next = (self.selected as i64 + delta as i64).clamp(0, len as i64 - 1) as usize;
        if next != self.selected {
            self.selected = next;
            self.heatmap = match self.selected_habit() {
                Some(habit) => compute_heatmap(habit, self.today),
                None => Vec::new(),
            };
        }
    }

    fn toggle_selected(&mut self, conn: &Connection) {
        let Some(habit) = self.selected_summary() else {
            return;
        };
        let (id, name) = (habit.id, habit.name.clone());

        match EntryRepo::toggle(conn, id, self.today) {
            Ok(true) => self.flash(format!("✓ {} done for today", name)),
            Ok(false) => self.flash(format!("○ {} cleared for today", name)),
            Err(e) => {
                warn!("Toggle failed for habit {}: {:#}", id, e);
                self.flash(format!("✗ {}", e));
                return;
            }
        }
        self.reload(conn);
    }

    fn log_selected(&mut self, conn: &Connection, value: u32, note: Option<&str>) {
        let Some(habit) = self.selected_summary() else {
            return;
        };
        let (id, name) = (habit.id, habit.name.clone());

        match EntryRepo::upsert(conn, id, self.today, value, note) {
            Ok(()) => self.flash(format!("✓ Logged {} for {}", value, name)),
            Err(e) => {
                warn!("Logging failed for habit {}: {:#}", id, e);
                self.flash(format!("✗ {}", e));
                return;
            }
        }
        self.reload(conn);
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], self.today, self.scope, self.range);
        statusbar::render(frame, outer_chunks[2], &self.view, self.message.as_deref());

        match self.view {
            View::Heatmap => self.draw_heatmap(frame, outer_chunks[1]),
            View::Dashboard => self.draw_dashboard(frame, outer_chunks[1]),
            View::Help => {
                self.draw_dashboard(frame, outer_chunks[1]);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode == InputMode::EntryInput {
            self.draw_entry_input(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame, body: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(body);

        habits::render(frame, columns[0], &self.overview.habits, self.selected, true);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(columns[1]);

        streak::render(frame, right[0], &self.overview, self.selected_summary());
        trend::render(frame, right[1], &self.trend, self.range);
    }

    fn draw_heatmap(&self, frame: &mut Frame, body: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(14), Constraint::Min(0)])
            .split(body);

        heatmap::render(
            frame,
            rows[0],
            self.selected_summary(),
            &self.heatmap,
            self.config.analytics.week_start,
        );
        habits::render(frame, rows[1], &self.overview.habits, self.selected, false);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = centered(area, 50, 15);
        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[↑ ↓]        ", "Select habit"),
            ("[Space]/Enter", "Toggle today's completion"),
            ("[n]          ", "Log a value and note for today"),
            ("[r]          ", "Cycle week / month / year"),
            ("[a]          ", "Active habits / all habits"),
            ("[h]          ", "Heatmap for the selected habit"),
            ("[?]          ", "Toggle help"),
            ("[Esc]        ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {}  ", key), theme::accent()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_entry_input(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 7 } else { 5 };
        let popup_area = centered(area, 60, height);
        frame.render_widget(Clear, popup_area);

        let name = self
            .selected_summary()
            .map(|h| h.name.as_str())
            .unwrap_or_default();

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  > ", theme::dim()),
                Span::styled(self.input_buffer.as_str(), theme::bold()),
                Span::styled("█", theme::accent()), // block cursor
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  [value] [note], e.g. `3 before lunch`  ·  [Enter] save  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let block = Block::default()
            .title(Span::styled(format!(" Log {} ", name), theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.input_error.is_some() {
                theme::red()
            } else {
                theme::amber()
            })
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = ((area.width as u32 * percent_x as u32 / 100) as u16).max(20).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Parse `[value] [note]`. A leading number is the value (default 1), the
/// rest is the note.
pub fn parse_entry_input(input: &str) -> Result<(u32, Option<String>), String> {
    let input = input.trim();
    let (first, rest) = match input.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (input, ""),
    };

    let (value, note) = if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
        let value = first
            .parse::<u32>()
            .map_err(|_| format!("'{}' is too large", first))?;
        (value, rest)
    } else {
        (1, input)
    };

    if value == 0 {
        return Err("Value must be at least 1".to_string());
    }
    let note = (!note.is_empty()).then(|| note.to_string());
    Ok((value, note))
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let mut app = App::new(config);
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(app.config.display.tick_rate_ms);

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Resize => {}
                Event::Tick => app.tick(&conn),
            }
        }
    })();

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::HabitDraft;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (Connection, App) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        HabitRepo::create(&conn, &HabitDraft::new("Read", "#6366f1")).unwrap();
        let walk = HabitRepo::create(&conn, &HabitDraft::new("Walk", "#10b981")).unwrap();
        HabitRepo::set_active(&conn, walk, false).unwrap();

        let mut app = App::new(AppConfig::default());
        app.load(&conn).unwrap();
        (conn, app)
    }

    #[test]
    fn entry_input_splits_value_and_note() {
        assert_eq!(parse_entry_input(""), Ok((1, None)));
        assert_eq!(parse_entry_input("3"), Ok((3, None)));
        assert_eq!(
            parse_entry_input(" 2  before lunch "),
            Ok((2, Some("before lunch".to_string())))
        );
        assert_eq!(parse_entry_input("felt good"), Ok((1, Some("felt good".to_string()))));
        assert!(parse_entry_input("0 nothing").is_err());
        assert!(parse_entry_input("99999999999").is_err());
    }

    #[test]
    fn space_toggles_todays_entry() {
        let (conn, mut app) = setup();
        assert_eq!(app.overview.completed_today, 0);

        app.handle_key(key(KeyCode::Char(' ')), &conn);
        assert_eq!(app.overview.completed_today, 1);
        assert_eq!(app.overview.habits[0].streak.current_streak, 1);

        app.handle_key(key(KeyCode::Char(' ')), &conn);
        assert_eq!(app.overview.completed_today, 0);
    }

    #[test]
    fn scope_toggle_includes_inactive_habits() {
        let (conn, mut app) = setup();
        assert_eq!(app.overview.tracked_habits, 1);

        app.handle_key(key(KeyCode::Char('a')), &conn);
        assert_eq!(app.scope, HabitScope::All);
        assert_eq!(app.overview.tracked_habits, 2);
        assert!(app.trend.iter().all(|p| p.total_habits == 2));
    }

    #[test]
    fn range_key_cycles_trend_length() {
        let (conn, mut app) = setup();
        assert_eq!(app.range, TimeRange::Month);

        app.handle_key(key(KeyCode::Char('r')), &conn);
        assert_eq!(app.range, TimeRange::Year);
        assert_eq!(app.trend.len(), 366);
        assert_eq!(app.trend.last().map(|p| p.date), Some(app.today));
    }

    #[test]
    fn note_popup_logs_value_and_note() {
        let (conn, mut app) = setup();
        app.handle_key(key(KeyCode::Char('n')), &conn);
        assert_eq!(app.input_mode, InputMode::EntryInput);

        for c in "4 long one".chars() {
            app.handle_key(key(KeyCode::Char(c)), &conn);
        }
        app.handle_key(key(KeyCode::Enter), &conn);
        assert_eq!(app.input_mode, InputMode::Normal);

        let id = app.overview.habits[0].id;
        let entries = EntryRepo::for_habit(&conn, id, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, 4);
        assert_eq!(entries[0].notes.as_deref(), Some("long one"));
    }

    #[test]
    fn heatmap_follows_selection() {
        let (conn, mut app) = setup();
        app.handle_key(key(KeyCode::Char('a')), &conn);
        app.handle_key(key(KeyCode::Char('h')), &conn);
        assert_eq!(app.view, View::Heatmap);
        assert_eq!(app.heatmap.len(), 366);

        app.handle_key(key(KeyCode::Down), &conn);
        assert_eq!(app.selected, 1);
        app.handle_key(key(KeyCode::Down), &conn);
        assert_eq!(app.selected, 1);

        app.handle_key(key(KeyCode::Esc), &conn);
        assert_eq!(app.view, View::Dashboard);
        app.handle_key(key(KeyCode::Esc), &conn);
        assert!(app.should_quit);
    }
}
