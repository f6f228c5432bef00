//! Color constants and auto-scaling helpers for the TUI.

use ratatui::style::Color;

/// Current trace color.
pub const CURRENT_COLOR: Color = Color::Cyan;
/// Zero-current reference line color.
pub const ZERO_COLOR: Color = Color::DarkGray;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Warning text color.
pub const WARNING_FG: Color = Color::Yellow;

/// Computes Y-axis bounds with 10% padding, always including zero.
pub fn auto_bounds_y(data: &[(f64, f64)]) -> [f64; 2] {
    let ys = data.iter().map(|&(_, y)| y);
    let min = ys.clone().fold(0.0, f64::min);
    let max = ys.fold(0.0, f64::max);
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [min - pad, max + pad]
}

/// Formats seconds as `HH:MM` for day views and as days otherwise.
pub fn time_label(seconds: f64, span: f64) -> String {
    if span <= 86_400.0 {
        let minutes = (seconds / 60.0).round() as u64;
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    } else {
        format!("{:.1} d", seconds / 86_400.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_include_zero() {
        let [lo, hi] = auto_bounds_y(&[(0.0, 5.0), (1.0, 10.0)]);
        assert!(lo < 0.0);
        assert!(hi > 10.0);
    }

    #[test]
    fn empty_data_has_unit_bounds() {
        let [lo, hi] = auto_bounds_y(&[]);
        assert!(lo < 0.0 && hi > 0.0);
    }

    #[test]
    fn labels_switch_with_span() {
        assert_eq!(time_label(3600.0, 86_400.0), "01:00");
        assert_eq!(time_label(86_400.0 * 3.0, 86_400.0 * 31.0), "3.0 d");
    }
}
