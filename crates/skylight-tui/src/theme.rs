//! Kiosk palette and semantic styling.
//!
//! One fixed palette; every tile goes through the style functions below so
//! the dashboard stays visually consistent.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const SKY_BLUE: Color = Color::Rgb(122, 200, 255); // #7ac8ff
pub const DAWN_ORANGE: Color = Color::Rgb(255, 179, 102); // #ffb366
pub const LEAF_GREEN: Color = Color::Rgb(120, 230, 150); // #78e696
pub const SUN_YELLOW: Color = Color::Rgb(250, 225, 120); // #fae178
pub const ALERT_RED: Color = Color::Rgb(255, 85, 85); // #ff5555

// ── Extended Palette ──────────────────────────────────────────────────

pub const SOFT_WHITE: Color = Color::Rgb(214, 219, 229); // #d6dbe5
pub const SLATE: Color = Color::Rgb(104, 118, 150); // #687696
pub const BG_HIGHLIGHT: Color = Color::Rgb(36, 44, 60); // #242c3c

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for tiles.
pub fn title_style() -> Style {
    Style::default().fg(SKY_BLUE).add_modifier(Modifier::BOLD)
}

/// Border for the focused tile.
pub fn border_focused() -> Style {
    Style::default().fg(DAWN_ORANGE)
}

/// Border for an unfocused tile.
pub fn border_default() -> Style {
    Style::default().fg(SLATE)
}

/// Normal body text.
pub fn body() -> Style {
    Style::default().fg(SOFT_WHITE)
}

/// Secondary text: timestamps, units, footers.
pub fn muted() -> Style {
    Style::default().fg(SLATE)
}

/// Large headline values (clock, temperature).
pub fn headline() -> Style {
    Style::default().fg(SOFT_WHITE).add_modifier(Modifier::BOLD)
}

/// Selected row in a list.
pub fn row_selected() -> Style {
    Style::default()
        .fg(DAWN_ORANGE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn error() -> Style {
    Style::default().fg(ALERT_RED)
}

pub fn warning() -> Style {
    Style::default().fg(SUN_YELLOW)
}

pub fn ok() -> Style {
    Style::default().fg(LEAF_GREEN)
}

/// Key hint text (e.g., "q quit  tab focus").
pub fn key_hint() -> Style {
    Style::default().fg(SLATE)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(SKY_BLUE).add_modifier(Modifier::BOLD)
}
