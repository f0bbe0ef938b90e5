//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};
use taskflow_proto::task::Priority;

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Brand color for the product name and active filter.
pub const ACCENT: Color = Color::Rgb(99, 102, 241);

/// Success indicator color.
pub const SUCCESS: Color = Color::Green;

/// Error color (inline form errors, overdue dates, sign out).
pub const ERROR: Color = Color::Red;

/// High priority badge.
pub const PRIORITY_HIGH: Color = Color::Rgb(220, 38, 38);

/// Medium priority badge.
pub const PRIORITY_MEDIUM: Color = Color::Rgb(217, 119, 6);

/// Low priority badge.
pub const PRIORITY_LOW: Color = Color::Rgb(37, 99, 235);

/// Panel title color for the list pane.
pub const LIST_TITLE: Color = Color::Cyan;

/// Panel title color for the detail pane.
pub const DETAIL_TITLE: Color = Color::Green;

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (dates, hints, metadata).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused borders and inputs).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Completed task title: dimmed and struck through.
#[must_use]
pub fn done() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::CROSSED_OUT)
}

/// Badge color for a priority.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => PRIORITY_HIGH,
        Priority::Medium => PRIORITY_MEDIUM,
        Priority::Low => PRIORITY_LOW,
    }
}

/// Style for a priority badge.
#[must_use]
pub fn priority_badge(priority: Priority) -> Style {
    Style::default().fg(priority_color(priority))
}

/// Style for a due date; red when overdue.
#[must_use]
pub fn due_date(overdue: bool) -> Style {
    if overdue {
        Style::default().fg(ERROR)
    } else {
        dimmed()
    }
}

/// Style for inline error messages.
#[must_use]
pub fn error() -> Style {
    Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
}

/// Placeholder and empty-state text (italic, dim).
#[must_use]
pub fn placeholder() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Border style for a pane, highlighted when it has focus.
#[must_use]
pub fn border(focused: bool) -> Style {
    if focused { highlighted() } else { normal() }
}
