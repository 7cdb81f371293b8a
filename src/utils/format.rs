use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// "1 day" / "N days"
pub fn format_days(days: u32) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Pad or truncate to exactly `width` terminal columns. Names can carry
/// emoji and CJK text, so byte or char counts are not enough.
pub fn fit_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        return format!("{}{}", s, " ".repeat(width - s.width()));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    format!("{}{}", out, " ".repeat(width.saturating_sub(used)))
}

/// Parse "#rrggbb" into an RGB triple.
pub fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_scales_and_clamps() {
        assert_eq!(progress_bar(1, 2, 4), "██░░");
        assert_eq!(progress_bar(5, 2, 4), "████");
        assert_eq!(progress_bar(0, 0, 3), "░░░");
    }

    #[test]
    fn fit_width_pads_and_truncates_by_columns() {
        assert_eq!(fit_width("Read", 6), "Read  ");
        assert_eq!(fit_width("Meditation", 6), "Medit…");
        assert_eq!(fit_width("水を飲む", 5), "水を…");
    }

    #[test]
    fn parses_hex_colours() {
        assert_eq!(hex_to_rgb("#6366f1"), Some((0x63, 0x66, 0xf1)));
        assert_eq!(hex_to_rgb("6366f1"), None);
        assert_eq!(hex_to_rgb("#zzzzzz"), None);
    }

    #[test]
    fn pluralises_days() {
        assert_eq!(format_days(1), "1 day");
        assert_eq!(format_days(0), "0 days");
    }
}
