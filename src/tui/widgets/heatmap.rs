use chrono::Datelike;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::analytics::{intensity, week_columns, HabitSummary, WeekStart};
use crate::models::HeatmapPoint;
use crate::tui::theme;
use crate::utils::format::format_days;

const CELL: &str = "■ ";
const LABEL_WIDTH: usize = 5;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    habit: Option<&HabitSummary>,
    points: &[HeatmapPoint],
    week_start: WeekStart,
) {
    let Some(habit) = habit else {
        let block = panel(" Heatmap ".to_string());
        let msg = Paragraph::new(Line::from(Span::styled("  No habit selected", theme::dim())))
            .block(block);
        frame.render_widget(msg, area);
        return;
    };

    let block = panel(format!(" {} · last year ", habit.name));

    let columns = week_columns(points, week_start);
    // Keep the most recent weeks when the terminal is narrow.
    let room = (area.width as usize).saturating_sub(LABEL_WIDTH + 2) / 2;
    let visible = &columns[columns.len().saturating_sub(room)..];
    let max = points.iter().map(|p| p.count).max().unwrap_or(0);

    let mut lines = vec![month_labels(visible)];

    let mut weekday = week_start.weekday();
    for row in 0..7 {
        let label = if row % 2 == 1 { weekday.to_string() } else { String::new() };
        weekday = weekday.succ();

        let mut spans = vec![Span::styled(format!(" {:<4}", label), theme::dim())];
        for column in visible {
            match column[row] {
                Some(point) => spans.push(Span::styled(
                    CELL,
                    Style::default().fg(theme::heat(intensity(point.count, max), &habit.color)),
                )),
                None => spans.push(Span::raw("  ")),
            }
        }
        lines.push(Line::from(spans));
    }

    let active_days = points.iter().filter(|p| p.count > 0).count();
    let mut legend = vec![Span::styled(" Less ", theme::dim())];
    for level in 0..=4 {
        legend.push(Span::styled(CELL, Style::default().fg(theme::heat(level, &habit.color))));
    }
    legend.push(Span::styled("More", theme::dim()));

    lines.push(Line::from(""));
    lines.push(Line::from(legend));
    lines.push(Line::from(vec![
        Span::styled(format!(" {} active days", active_days), theme::bold()),
        Span::styled(
            format!(
                "  ·  current {}  ·  best {}",
                format_days(habit.streak.current_streak),
                format_days(habit.streak.max_streak)
            ),
            theme::dim(),
        ),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn panel(title: String) -> Block<'static> {
    Block::default()
        .title(Span::styled(title, theme::accent().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface())
}

/// Month abbreviations above the first column of each month.
fn month_labels(columns: &[[Option<HeatmapPoint>; 7]]) -> Line<'static> {
    let mut row = vec![' '; LABEL_WIDTH + 1 + columns.len() * 2];
    let mut last_month = None;

    for (i, column) in columns.iter().enumerate() {
        let Some(first) = column.iter().flatten().next() else {
            continue;
        };
        let month = first.date.month();
        if last_month == Some(month) {
            continue;
        }
        last_month = Some(month);

        let at = LABEL_WIDTH + 1 + i * 2;
        let name = first.date.format("%b").to_string();
        if at + name.len() <= row.len() {
            for (offset, c) in name.chars().enumerate() {
                row[at + offset] = c;
            }
        }
    }

    Line::from(Span::styled(row.into_iter().collect::<String>(), theme::dim()))
}
