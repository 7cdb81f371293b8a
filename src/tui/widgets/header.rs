use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::analytics::{HabitScope, TimeRange};
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, today: NaiveDate, scope: HabitScope, range: TimeRange) {
    let title_line = Line::from(vec![
        Span::styled("habitrack", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(today.format("%A, %b %d, %Y").to_string(), theme::dim()),
    ]);

    let scope_line = Line::from(vec![
        Span::styled(scope.label(), theme::bold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(range.label(), theme::amber()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::base());

    let paragraph = Paragraph::new(vec![title_line, scope_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
