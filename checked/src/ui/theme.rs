//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Brand color used for the header, checkboxes, and accents.
pub const BRAND: Color = Color::Rgb(0, 196, 149);

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Success/online indicator color.
pub const SUCCESS: Color = Color::Green;

/// Offline indicator color.
pub const OFFLINE: Color = Color::DarkGray;

/// Color for overdue due dates.
pub const OVERDUE: Color = Color::Red;

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (done tasks, metadata).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Done-task text style (dimmed and crossed out).
#[must_use]
pub fn done_task() -> Style {
    Style::default()
        .fg(FG_SECONDARY)
        .add_modifier(Modifier::CROSSED_OUT)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Brand-colored style for the app title and checked boxes.
#[must_use]
pub fn brand() -> Style {
    Style::default().fg(BRAND).add_modifier(Modifier::BOLD)
}

/// Selected row style.
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(BRAND)
        .add_modifier(Modifier::BOLD)
}

/// Section header style (collapsible pending/done headers).
#[must_use]
pub fn section_header() -> Style {
    Style::default().fg(BRAND).add_modifier(Modifier::BOLD)
}

/// Style for an active inline edit buffer.
#[must_use]
pub fn edit_field() -> Style {
    Style::default().fg(Color::Black).bg(Color::White)
}

/// Style for the status bar background.
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(20, 40, 35))
}
