//! Named palettes read by every emitter: series colors, typography, grid and
//! text colors. Three themes, process-constant.

use crate::pipeline::types::Theme;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub colors: &'static [&'static str],
    pub font_family: &'static str,
    pub text_color: &'static str,
    pub grid_color: &'static str,
    pub title_size: u32,
    pub label_size: u32,
}

const PROFESSIONAL_COLORS: &[&str] = &[
    "#2563eb", "#0ea5e9", "#10b981", "#f59e0b", "#8b5cf6", "#ef4444", "#14b8a6", "#64748b",
    "#ec4899", "#84cc16",
];

const CORPORATE_COLORS: &[&str] = &[
    "#1f3a5f", "#2e5984", "#4f81bd", "#8064a2", "#9bbb59", "#c0504d", "#4bacc6", "#f79646",
    "#77933c", "#604a7b",
];

const VIBRANT_COLORS: &[&str] = &[
    "#ff6384", "#36a2eb", "#ffce56", "#4bc0c0", "#9966ff", "#ff9f40", "#2ecc71", "#e74c3c",
    "#f1c40f", "#1abc9c",
];

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let colors = match theme {
            Theme::Professional => PROFESSIONAL_COLORS,
            Theme::Corporate => CORPORATE_COLORS,
            Theme::Vibrant => VIBRANT_COLORS,
        };
        Self {
            colors,
            font_family: "Inter, 'Segoe UI', sans-serif",
            text_color: "#1f2937",
            grid_color: "rgba(148, 163, 184, 0.25)",
            title_size: 18,
            label_size: 13,
        }
    }

    /// Series color at index, cycling past the palette length.
    pub fn color(&self, index: usize) -> &'static str {
        self.colors[index % self.colors.len()]
    }

    /// Series color at index as an `rgba()` string with the given opacity.
    pub fn color_with_alpha(&self, index: usize, alpha: f64) -> String {
        rgba(self.color(index), alpha)
    }
}

/// `#rrggbb` to `rgba(r, g, b, a)`. Non-hex input passes through unchanged
/// so palette entries that are already rgba stay valid.
pub fn rgba(hex: &str, alpha: f64) -> String {
    let Some(stripped) = hex.strip_prefix('#') else {
        return hex.to_string();
    };
    if stripped.len() != 6 {
        return hex.to_string();
    }
    let parse = |range| u8::from_str_radix(&stripped[range], 16).unwrap_or(0);
    let (r, g, b) = (parse(0..2), parse(2..4), parse(4..6));
    format!("rgba({r}, {g}, {b}, {alpha})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_have_ten_colors_and_cycle() {
        for theme in [Theme::Professional, Theme::Corporate, Theme::Vibrant] {
            let palette = Palette::for_theme(theme);
            assert_eq!(palette.colors.len(), 10);
            assert_eq!(palette.color(0), palette.color(10));
        }
    }

    #[test]
    fn rgba_conversion() {
        assert_eq!(rgba("#2563eb", 0.7), "rgba(37, 99, 235, 0.7)");
        assert_eq!(rgba("rgba(1,2,3,0.5)", 0.7), "rgba(1,2,3,0.5)");
    }
}
