use chrono::Datelike;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::analytics::{bucket_by_month, TimeRange};
use crate::models::CompletionPoint;
use crate::tui::theme;

/// Completion percentage per day, or per month for the yearly range.
pub fn render(frame: &mut Frame, area: Rect, points: &[CompletionPoint], range: TimeRange) {
    let block = Block::default()
        .title(Span::styled(format!(" Completion · {} ", range.label()), theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    if points.iter().all(|p| p.total_habits == 0) {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Nothing tracked in this period", theme::dim())),
        ])
        .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = if range == TimeRange::Year {
        bucket_by_month(points)
            .into_iter()
            .map(|b| {
                let label = b.label.chars().take(3).collect::<String>();
                bar(b.percent(), label)
            })
            .collect()
    } else {
        points
            .iter()
            .map(|p| bar(p.percent(), p.date.day().to_string()))
            .collect()
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / bars.len().max(1)).saturating_sub(1).clamp(1, 6) as u16;

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(100);

    frame.render_widget(chart, area);
}

fn bar(percent: u32, label: String) -> Bar<'static> {
    let color = match percent {
        100 => theme::GREEN,
        50..=99 => theme::ACCENT,
        1..=49 => theme::AMBER,
        _ => theme::TEXT_DIM,
    };
    Bar::default()
        .value(percent as u64)
        .label(Line::from(label))
        .text_value(String::new())
        .style(Style::default().fg(color))
}
