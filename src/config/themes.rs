use ratatui::style::Color;

use super::ThemeName;

/// Colours the dashboard draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub muted: Color,
    pub highlight: Color,
    pub positive: Color,
    pub neutral: Color,
    pub negative: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub alert: Color,
}

impl Palette {
    pub fn for_theme(theme: ThemeName) -> Self {
        match theme {
            ThemeName::Dark => Self {
                accent: Color::Cyan,
                muted: Color::Gray,
                highlight: Color::Yellow,
                positive: Color::Green,
                neutral: Color::Blue,
                negative: Color::Red,
                selection_bg: Color::Blue,
                selection_fg: Color::Black,
                alert: Color::Magenta,
            },
            ThemeName::Light => Self {
                accent: Color::Blue,
                muted: Color::DarkGray,
                highlight: Color::Magenta,
                positive: Color::Green,
                neutral: Color::Cyan,
                negative: Color::Red,
                selection_bg: Color::Cyan,
                selection_fg: Color::Black,
                alert: Color::Red,
            },
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_theme(ThemeName::default())
    }
}
