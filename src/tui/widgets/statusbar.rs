use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::View;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, view: &View, message: Option<&str>) {
    if let Some(message) = message {
        let line = Line::from(Span::styled(message, theme::amber()));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
        return;
    }

    let hints: &[(&str, &str)] = match view {
        View::Heatmap => &[("[↑↓]", " habit  "), ("[h]", " back  "), ("[?]", " help  "), ("[Esc]", " back")],
        View::Help => &[("[?]", " close  "), ("[Esc]", " close")],
        View::Dashboard => &[
            ("[Space]", " toggle  "),
            ("[n]", " log  "),
            ("[r]", " range  "),
            ("[a]", " scope  "),
            ("[h]", " heatmap  "),
            ("[?]", " help  "),
            ("[Esc]", " quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(*key, theme::accent()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
