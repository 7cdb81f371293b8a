use ratatui::style::{Color, Modifier, Style};

use crate::utils::format::hex_to_rgb;

pub const BG: Color = Color::Rgb(15, 17, 26);
pub const SURFACE: Color = Color::Rgb(24, 26, 38);
pub const BORDER: Color = Color::Rgb(55, 58, 82);
pub const TEXT: Color = Color::Rgb(226, 228, 240);
pub const TEXT_DIM: Color = Color::Rgb(120, 124, 150);
pub const ACCENT: Color = Color::Rgb(99, 102, 241);
pub const GREEN: Color = Color::Rgb(16, 185, 129);
pub const AMBER: Color = Color::Rgb(245, 158, 11);
pub const RED: Color = Color::Rgb(239, 68, 68);
pub const EMPTY: Color = Color::Rgb(36, 38, 54);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border(focused: bool) -> Style {
    if focused {
        accent()
    } else {
        Style::default().fg(BORDER)
    }
}

/// A habit's stored colour, falling back to the accent.
pub fn habit_color(hex: &str) -> Color {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => ACCENT,
    }
}

/// Heatmap cell colour: level 0 is the empty cell, 4 the full habit colour.
pub fn heat(level: u8, hex: &str) -> Color {
    let (Color::Rgb(er, eg, eb), Color::Rgb(hr, hg, hb)) = (EMPTY, habit_color(hex)) else {
        return EMPTY;
    };
    let t = level.min(4) as f64 / 4.0;
    let mix = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
    Color::Rgb(mix(er, hr), mix(eg, hg), mix(eb, hb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_blends_from_empty_to_habit_colour() {
        assert_eq!(heat(0, "#ffffff"), EMPTY);
        assert_eq!(heat(4, "#10b981"), Color::Rgb(0x10, 0xb9, 0x81));
        assert_eq!(heat(9, "#10b981"), heat(4, "#10b981"));
    }

    #[test]
    fn bad_colour_falls_back_to_accent() {
        assert_eq!(habit_color("teal"), ACCENT);
    }
}
