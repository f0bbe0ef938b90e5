//! Terminal UI rendering.

pub mod auth_form;
pub mod landing;
pub mod status_bar;
pub mod task_detail;
pub mod task_list;
pub mod theme;

use std::fmt::Write as _;

use chrono::NaiveDate;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::{App, Screen};

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Create main layout with status bar at bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let content_area = main_chunks[0];
    let status_area = main_chunks[1];

    match app.screen {
        Screen::Landing => landing::render(frame, content_area),
        Screen::Auth => auth_form::render(frame, content_area, &app.gateway),
        Screen::Tasks => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(40), // List
                    Constraint::Percentage(60), // Detail
                ])
                .split(content_area);

            task_list::render(frame, content_chunks[0], app);
            task_detail::render(frame, content_chunks[1], app);
        }
    }

    status_bar::render(frame, status_area, app);
}

/// Formats a due date, falling back to ISO form if `format` is invalid.
#[must_use]
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}
