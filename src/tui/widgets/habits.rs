use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::analytics::HabitSummary;
use crate::tui::theme;
use crate::utils::format::fit_width;

pub fn render(frame: &mut Frame, area: Rect, habits: &[HabitSummary], selected: usize, focused: bool) {
    let block = Block::default()
        .title(Span::styled(format!(" Habits ({}) ", habits.len()), theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(focused))
        .style(theme::surface());

    if habits.is_empty() {
        let empty = List::new(vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  No habits yet. Run `habitrack add <name>`.",
                theme::dim(),
            ))),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(22).clamp(8, 32);

    let items: Vec<ListItem> = habits
        .iter()
        .map(|h| {
            let (mark, mark_style) = if h.done_today {
                ("✓", theme::green().add_modifier(Modifier::BOLD))
            } else {
                ("○", theme::dim())
            };
            let name_style = if h.is_active { theme::bold() } else { theme::dim() };
            let streak_style = if h.streak.current_streak > 0 {
                theme::amber()
            } else {
                theme::dim()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", mark), mark_style),
                Span::styled("● ", Style::default().fg(theme::habit_color(&h.color))),
                Span::styled(fit_width(&h.name, name_width), name_style),
                Span::styled(format!("  🔥{:>4}", h.streak.current_streak), streak_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::accent().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▌");

    let mut state = ListState::default().with_selected(Some(selected.min(habits.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}
