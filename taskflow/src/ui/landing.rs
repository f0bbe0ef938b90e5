//! Landing screen: product name, tagline, and the way in.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;

/// Tagline under the product name.
pub const TAGLINE: &str = "Simplify your day. Track tasks. Boost productivity.";

/// Render the landing screen.
pub fn render(frame: &mut Frame, area: Rect) {
    let [content] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(area);

    let lines = vec![
        Line::from(Span::styled("TaskFlow", theme::panel_title(theme::ACCENT))),
        Line::from(""),
        Line::from(Span::styled(TAGLINE, theme::dimmed())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[l] Login", theme::highlighted()),
            Span::raw("    "),
            Span::styled("[r] Register", theme::normal()),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        content,
    );
}
