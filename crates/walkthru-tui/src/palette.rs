//! Colors for the two themes.

use ratatui::style::{Color, Modifier, Style};
use walkthru_core::host::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub insert: Color,
    pub delete: Color,
    pub highlight: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Rgb(24, 24, 27),
                surface: Color::Rgb(39, 39, 42),
                text: Color::Rgb(228, 228, 231),
                muted: Color::Rgb(113, 113, 122),
                border: Color::Rgb(63, 63, 70),
                accent: Color::Rgb(167, 139, 250),
                insert: Color::Rgb(74, 222, 128),
                delete: Color::Rgb(248, 113, 113),
                highlight: Color::Rgb(49, 46, 129),
            },
            Theme::Light => Self {
                background: Color::Rgb(255, 255, 255),
                surface: Color::Rgb(244, 244, 245),
                text: Color::Rgb(24, 24, 27),
                muted: Color::Rgb(113, 113, 122),
                border: Color::Rgb(212, 212, 216),
                accent: Color::Rgb(109, 40, 217),
                insert: Color::Rgb(22, 163, 74),
                delete: Color::Rgb(220, 38, 38),
                highlight: Color::Rgb(237, 233, 254),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn insertion(&self) -> Style {
        Style::default()
            .fg(self.insert)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn deletion(&self) -> Style {
        Style::default()
            .fg(self.delete)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn button(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}
