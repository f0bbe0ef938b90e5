//! Login and register forms.

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::session::{AuthField, AuthMode, SessionGateway};

const FORM_WIDTH: u16 = 48;

const fn placeholder(mode: AuthMode, field: AuthField) -> &'static str {
    match (mode, field) {
        (_, AuthField::Name) => "Full Name",
        (AuthMode::Login, AuthField::Email) => "Enter your email",
        (AuthMode::Login, AuthField::Password) => "Enter your password",
        (AuthMode::Register, AuthField::Email) => "Email",
        (AuthMode::Register, AuthField::Password) => "Password",
    }
}

/// Input text as displayed; passwords are masked.
fn shown_value(gateway: &SessionGateway, field: AuthField) -> String {
    let value = gateway.value(field);
    match field {
        AuthField::Password => "\u{2022}".repeat(value.chars().count()),
        AuthField::Name | AuthField::Email => value.to_string(),
    }
}

/// Render the credential form for the gateway's current mode.
pub fn render(frame: &mut Frame, area: Rect, gateway: &SessionGateway) {
    let fields = gateway.fields();
    let height = u16::try_from(fields.len() * 3 + 4).unwrap_or(u16::MAX);
    let [column] = Layout::horizontal([Constraint::Length(FORM_WIDTH)])
        .flex(Flex::Center)
        .areas(area);
    let [form] = Layout::vertical([Constraint::Length(height + 2)])
        .flex(Flex::Center)
        .areas(column);

    let block = Block::default()
        .title(Span::styled(
            gateway.mode().title(),
            theme::panel_title(theme::ACCENT),
        ))
        .borders(Borders::ALL)
        .border_style(theme::normal());
    let inner = block.inner(form);
    frame.render_widget(block, form);

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(inner);

    for (idx, field) in fields.iter().enumerate() {
        let focused = gateway.focus() == *field;
        let value = shown_value(gateway, *field);
        let text = if value.is_empty() {
            Line::from(Span::styled(
                placeholder(gateway.mode(), *field),
                theme::placeholder(),
            ))
        } else {
            Line::from(Span::styled(value, theme::normal()))
        };
        let input = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border(focused)),
        );
        frame.render_widget(input, rows[idx]);
    }

    let status = if gateway.is_submitting() {
        Line::from(Span::styled("Submitting\u{2026}", theme::dimmed()))
    } else if let Some(msg) = gateway.error_message() {
        Line::from(Span::styled(msg, theme::error()))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(status), rows[fields.len()]);

    let switch_hint = match gateway.mode() {
        AuthMode::Login => "Ctrl-T: create an account",
        AuthMode::Register => "Ctrl-T: already have an account?",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(switch_hint, theme::dimmed()))),
        rows[fields.len() + 1],
    );
}
