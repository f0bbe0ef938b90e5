//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Screen, TaskFocus};
use crate::tasks::Mode;

/// Key hints for the current screen and focus.
#[must_use]
pub const fn help_text(app: &App) -> &'static str {
    match app.screen {
        Screen::Landing => "l: login | r: register | q: quit",
        Screen::Auth => "Enter: submit | Tab: next field | Ctrl-T: switch form | Esc: back",
        Screen::Tasks => match (app.tasks.mode(), app.focus) {
            (Mode::Create | Mode::Edit, _) => {
                "Tab: next field | \u{2190}\u{2192}: change | Enter: save | Esc: cancel"
            }
            (Mode::View, TaskFocus::Search) => "type to search | Enter: done | Esc: clear",
            (Mode::View, TaskFocus::List) => {
                "\u{2191}\u{2193}/jk: move | Enter: open | space: toggle | n: new | /: search | f: filter | r: refresh | o: sign out | q: quit"
            }
        },
    }
}

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (dot_color, status_text) = if app.session().is_some() {
        (theme::SUCCESS, "Signed in")
    } else {
        (theme::FG_SECONDARY, "Signed out")
    };

    let mut spans = vec![
        Span::styled(concat!("TaskFlow v", env!("CARGO_PKG_VERSION")), theme::bold()),
        Span::raw(" | "),
        Span::styled("\u{25cf}", theme::normal().fg(dot_color)),
        Span::raw(format!(" {status_text}")),
        Span::raw(" | "),
    ];
    match app.notice() {
        Some(notice) => spans.push(Span::styled(notice, theme::error())),
        None => spans.push(Span::styled(help_text(app), theme::dimmed())),
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
