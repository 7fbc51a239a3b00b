//! Color theme for the TUI.
//!
//! Dark and light themes share one layout of semantic styles and differ
//! only in the palette they are built from.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Theme variant (dark or light).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// The other variant.
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Current theme variant.
    pub variant: ThemeVariant,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Grid
    pub column_head: Style,
    pub row_head: Style,
    pub cell: Style,
    pub null_cell: Style,
    /// Row the cursor sits on.
    pub cursor_row: Style,
    /// Cells inside the selection rectangle.
    pub selection: Style,
    /// Unsaved values shown in the cursor row.
    pub dirty: Style,

    // Navigation bar
    pub nav_button: Style,
    pub nav_disabled: Style,
    pub nav_position: Style,

    // UI elements
    pub border: Style,
    pub title: Style,
    pub help_key: Style,
    pub help_desc: Style,
    pub field_name: Style,
    pub field_selected: Style,

    // Header/Footer
    pub header: Style,
    pub footer: Style,

    // Input prompts
    pub input_prompt: Style,
    pub input_text: Style,
    pub input_cursor: Style,
}

/// Neutral ramp plus accents a theme is built from.
struct Palette {
    /// Neutral roles, from the page background up to emphasized text.
    page: Color,
    raised: Color,
    rule: Color,
    faint: Color,
    dim: Color,
    text: Color,
    strong: Color,
    accent: Color,
    accent_soft: Color,
    ok: Color,
    caution: Color,
    bad: Color,
    edited: Color,
}

// Zinc neutrals with a teal accent (Tailwind CSS colors).
const DARK: Palette = Palette {
    page: Color::Rgb(24, 24, 27),
    raised: Color::Rgb(39, 39, 42),
    rule: Color::Rgb(63, 63, 70),
    faint: Color::Rgb(82, 82, 91),
    dim: Color::Rgb(161, 161, 170),
    text: Color::Rgb(228, 228, 231),
    strong: Color::Rgb(250, 250, 250),
    accent: Color::Rgb(45, 212, 191),
    accent_soft: Color::Rgb(19, 78, 74),
    ok: Color::Rgb(74, 222, 128),
    caution: Color::Rgb(250, 204, 21),
    bad: Color::Rgb(248, 113, 113),
    edited: Color::Rgb(251, 146, 60),
};

const LIGHT: Palette = Palette {
    page: Color::Rgb(250, 250, 250),
    raised: Color::Rgb(244, 244, 245),
    rule: Color::Rgb(228, 228, 231),
    faint: Color::Rgb(161, 161, 170),
    dim: Color::Rgb(82, 82, 91),
    text: Color::Rgb(39, 39, 42),
    strong: Color::Rgb(9, 9, 11),
    accent: Color::Rgb(15, 118, 110),
    accent_soft: Color::Rgb(204, 251, 241),
    ok: Color::Rgb(21, 128, 61),
    caution: Color::Rgb(161, 98, 7),
    bad: Color::Rgb(185, 28, 28),
    edited: Color::Rgb(194, 65, 12),
};

impl Theme {
    /// Dark theme.
    pub fn dark() -> Self {
        Self::build(ThemeVariant::Dark, &DARK)
    }

    /// Light theme.
    pub fn light() -> Self {
        Self::build(ThemeVariant::Light, &LIGHT)
    }

    fn build(variant: ThemeVariant, p: &Palette) -> Self {
        let bold = Modifier::BOLD;
        Self {
            variant,
            background: p.page,
            foreground: p.text,
            muted: p.faint,

            success: p.ok,
            warning: p.caution,
            error: p.bad,
            info: p.accent,

            column_head: Style::new().bg(p.raised).fg(p.accent).add_modifier(bold),
            row_head: Style::new().bg(p.raised).fg(p.dim),
            cell: Style::new().fg(p.text),
            null_cell: Style::new().fg(p.faint),
            cursor_row: Style::new().bg(p.rule).fg(p.strong).add_modifier(bold),
            selection: Style::new().bg(p.accent_soft).fg(p.strong),
            dirty: Style::new().fg(p.edited).add_modifier(Modifier::ITALIC),

            nav_button: Style::new().fg(p.accent).add_modifier(bold),
            nav_disabled: Style::new().fg(p.faint),
            nav_position: Style::new().bg(p.rule).fg(p.strong),

            border: Style::new().fg(p.faint),
            title: Style::new().fg(p.accent).add_modifier(bold),
            help_key: Style::new().fg(p.accent).add_modifier(bold),
            help_desc: Style::new().fg(p.dim),
            field_name: Style::new().fg(p.dim),
            field_selected: Style::new().bg(p.rule).fg(p.strong),

            header: Style::new().bg(p.raised).fg(p.text),
            footer: Style::new().bg(p.raised).fg(p.dim),

            input_prompt: Style::new().fg(p.accent).add_modifier(bold),
            input_text: Style::new().fg(p.strong),
            input_cursor: Style::new().add_modifier(Modifier::REVERSED),
        }
    }

    /// Create theme from variant.
    pub fn from_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    /// Toggle between dark and light themes.
    pub fn toggle(&self) -> Self {
        Self::from_variant(self.variant.toggle())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
