//! Dark and light palettes with semantic styles.
//!
//! Screens pick a palette from the persisted theme flag and style through
//! the helpers below, never through raw colors.

use ratatui::style::{Color, Modifier, Style};
use retrievos_core::{RecommendationClass, Severity};

pub struct Palette {
    pub accent: Color,
    pub accent_alt: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub bg: Color,
    pub bg_highlight: Color,
    pub ok: Color,
    pub warn: Color,
    pub error: Color,
    pub critical: Color,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
}

pub const DARK: Palette = Palette {
    accent: Color::Rgb(128, 255, 234),    // #80ffea
    accent_alt: Color::Rgb(225, 53, 255), // #e135ff
    text: Color::Rgb(189, 193, 207),      // #bdc1cf
    muted: Color::Rgb(98, 114, 164),      // #6272a4
    border: Color::Rgb(98, 114, 164),
    bg: Color::Rgb(30, 31, 41),           // #1e1f29
    bg_highlight: Color::Rgb(40, 42, 54), // #282a36
    ok: Color::Rgb(80, 250, 123),         // #50fa7b
    warn: Color::Rgb(241, 250, 140),      // #f1fa8c
    error: Color::Rgb(255, 99, 99),       // #ff6363
    critical: Color::Rgb(255, 85, 85),
    high: Color::Rgb(255, 160, 80),
    medium: Color::Rgb(241, 250, 140),
    low: Color::Rgb(139, 233, 253),
};

pub const LIGHT: Palette = Palette {
    accent: Color::Rgb(0, 110, 160),
    accent_alt: Color::Rgb(140, 30, 170),
    text: Color::Rgb(40, 42, 54),
    muted: Color::Rgb(110, 115, 130),
    border: Color::Rgb(160, 165, 180),
    bg: Color::Rgb(250, 250, 252),
    bg_highlight: Color::Rgb(225, 230, 240),
    ok: Color::Rgb(20, 140, 60),
    warn: Color::Rgb(170, 120, 0),
    error: Color::Rgb(200, 30, 30),
    critical: Color::Rgb(190, 20, 20),
    high: Color::Rgb(200, 90, 0),
    medium: Color::Rgb(150, 120, 0),
    low: Color::Rgb(0, 110, 160),
};

pub fn palette(light: bool) -> &'static Palette {
    if light { &LIGHT } else { &DARK }
}

impl Palette {
    /// Base style for a full-screen area.
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.bg)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.accent_alt } else { self.border })
    }

    pub fn table_header(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn table_row(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn table_selected(&self) -> Style {
        Style::default()
            .fg(self.accent_alt)
            .bg(self.bg_highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.accent_alt)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text)
        }
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn key_hint_key(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// Styling for the recommendation column. Unclassified text is left plain.
    pub fn recommendation(&self, class: RecommendationClass) -> Style {
        match class {
            RecommendationClass::Upgrade => Style::default().fg(self.warn),
            RecommendationClass::NoChange => Style::default().fg(self.ok),
            RecommendationClass::Unclassified => Style::default(),
        }
    }

    /// Log lines flagged as warnings.
    pub fn log_warning(&self) -> Style {
        Style::default().fg(self.warn).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn severity_colors_are_distinct() {
        for pal in [&DARK, &LIGHT] {
            let colors: Vec<Color> = Severity::iter().map(|s| pal.severity(s)).collect();
            for (i, a) in colors.iter().enumerate() {
                assert!(!colors[i + 1..].contains(a));
            }
        }
    }

    #[test]
    fn unclassified_recommendation_is_unstyled() {
        assert_eq!(
            DARK.recommendation(RecommendationClass::Unclassified),
            Style::default()
        );
        assert_ne!(
            DARK.recommendation(RecommendationClass::Upgrade),
            Style::default()
        );
    }

    #[test]
    fn palette_follows_theme_flag() {
        assert_eq!(palette(true).bg, LIGHT.bg);
        assert_eq!(palette(false).bg, DARK.bg);
    }
}
