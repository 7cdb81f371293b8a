use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::analytics::{HabitSummary, Overview};
use crate::tui::theme;
use crate::utils::format::{format_days, progress_bar};

pub fn render(frame: &mut Frame, area: Rect, overview: &Overview, selected: Option<&HabitSummary>) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let mut lines = vec![Line::from("")];

    match selected {
        Some(habit) => {
            let color = theme::habit_color(&habit.color);
            // Bar shows progress toward the habit's own best run.
            let best = habit.streak.max_streak.max(1);
            lines.push(Line::from(vec![
                Span::styled("  ", theme::dim()),
                Span::styled(habit.name.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  ", theme::dim()),
                Span::styled(progress_bar(habit.streak.current_streak, best, 12), Style::default().fg(color)),
                Span::styled(
                    format!("  {}", format_days(habit.streak.current_streak)),
                    theme::green().add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!(
                    "  Best: {}  ·  Logged done: {}%",
                    format_days(habit.streak.max_streak),
                    habit.completion_rate
                ),
                theme::dim(),
            )));
        }
        None => lines.push(Line::from(Span::styled("  No habit selected", theme::dim()))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Today: ", theme::dim()),
        Span::styled(
            format!("{}/{} ({}%)", overview.completed_today, overview.tracked_habits, overview.today_rate),
            if overview.tracked_habits > 0 && overview.completed_today == overview.tracked_habits {
                theme::green()
            } else {
                theme::bold()
            },
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!(
            "  Best overall: {}  ·  Live: {}",
            format_days(overview.best_streak),
            overview.live_streaks
        ),
        theme::dim(),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
