//! Clinical theme tokens for the MedRecord portal.
//!
//! # Color Palette
//! - **Background**: Deep navy (base layer)
//! - **Accent**: Clinic blue (primary highlights, focus)
//! - **Positive**: Mint green (normal findings, saved reports)
//! - **Negative**: Coral red (abnormal findings, errors)
//! - **Warning**: Amber (severity, pending actions)
//! - **Neutral**: Lavender (secondary info)
//! - **Muted**: Slate (hints, disabled text)

use ratatui::style::{Color, Modifier, Style};

/// Portal color palette.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::clinic()
    }
}

impl Theme {
    pub const fn clinic() -> Self {
        Self {
            background: Color::Rgb(15, 23, 42),
            accent: Color::Rgb(37, 99, 235),
            positive: Color::Rgb(34, 197, 94),
            negative: Color::Rgb(239, 68, 68),
            warning: Color::Rgb(245, 158, 11),
            neutral: Color::Rgb(167, 139, 250),
            muted: Color::Rgb(100, 116, 139),
            text_primary: Color::White,
            text_secondary: Color::Rgb(203, 213, 225),
        }
    }

    /// Color for the diagnosis label: green when normal, red otherwise.
    pub fn finding_color(&self, is_normal: bool) -> Color {
        if is_normal {
            self.positive
        } else {
            self.negative
        }
    }

    /// Color for a severity string reported by the service.
    pub fn severity_color(&self, severity: &str) -> Color {
        match severity.to_ascii_lowercase().as_str() {
            "mild" => self.neutral,
            "moderate" => self.warning,
            "severe" | "critical" => self.negative,
            _ => self.text_secondary,
        }
    }
}

const PALETTE: Theme = Theme::clinic();

pub fn accent() -> Style {
    Style::default().fg(PALETTE.accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(PALETTE.muted)
}

pub fn neutral() -> Style {
    Style::default().fg(PALETTE.neutral)
}

pub fn negative() -> Style {
    Style::default().fg(PALETTE.negative)
}

pub fn warning() -> Style {
    Style::default().fg(PALETTE.warning)
}

pub fn text() -> Style {
    Style::default().fg(PALETTE.text_primary)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Bold diagnosis style.
pub fn finding(is_normal: bool) -> Style {
    Style::default()
        .fg(PALETTE.finding_color(is_normal))
        .add_modifier(Modifier::BOLD)
}

pub fn severity(severity: &str) -> Style {
    Style::default().fg(PALETTE.severity_color(severity))
}
