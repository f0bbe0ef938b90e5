//! Detail pane: the create/edit form, the selected task, or the empty state.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use taskflow_proto::task::Task;

use super::theme;
use crate::app::App;
use crate::tasks::{DraftField, Mode, TaskCollection};

/// Heading of the empty detail pane.
pub const NO_SELECTION: &str = "No Task Selected";

/// Shown in place of a missing description.
pub const NO_DESCRIPTION: &str = "No description provided.";

/// Human label for the detail status row.
#[must_use]
pub const fn status_label(task: &Task) -> &'static str {
    if task.status.is_done() {
        "Completed"
    } else {
        "In Progress"
    }
}

/// Render the detail pane.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    match app.tasks.mode() {
        Mode::Create | Mode::Edit => render_form(frame, area, &app.tasks),
        Mode::View => match app.tasks.selected_task() {
            Some(task) => render_task(frame, area, task, app),
            None => render_empty(frame, area),
        },
    }
}

fn pane(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(title, theme::panel_title(theme::DETAIL_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::normal())
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(NO_SELECTION, theme::bold())),
        Line::from(Span::styled(
            "Select a task from the list or press n to create a new one.",
            theme::dimmed(),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).centered().block(pane("Details")),
        area,
    );
}

fn render_task(frame: &mut Frame, area: Rect, task: &Task, app: &App) {
    let done = task.status.is_done();
    let mut header = vec![
        Span::styled(
            if done { "[\u{2713}] " } else { "[ ] " },
            theme::dimmed(),
        ),
        Span::styled(
            task.title.as_str(),
            if done { theme::done() } else { theme::bold() },
        ),
    ];
    header.push(Span::raw("  "));
    header.push(Span::styled(
        task.priority.to_string(),
        theme::priority_badge(task.priority),
    ));
    if let Some(due) = task.due_date {
        header.push(Span::raw("  "));
        header.push(Span::styled(
            super::format_date(due, &app.date_format),
            theme::due_date(task.is_overdue(app.today)),
        ));
    }

    let description = match task.description.as_deref() {
        Some(text) if !text.is_empty() => Line::from(Span::styled(text, theme::normal())),
        _ => Line::from(Span::styled(NO_DESCRIPTION, theme::placeholder())),
    };

    let lines = vec![
        Line::from(header),
        Line::from(""),
        Line::from(Span::styled("DESCRIPTION", theme::dimmed())),
        description,
        Line::from(""),
        Line::from(vec![
            Span::styled("Status  ", theme::dimmed()),
            Span::styled(status_label(task), theme::normal()),
        ]),
        Line::from(vec![
            Span::styled("Task ID ", theme::dimmed()),
            Span::styled(format!("#{}", task.id), theme::dimmed()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "t: toggle  e: edit  d: delete  Esc: close",
            theme::dimmed(),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(pane("Task Details")),
        area,
    );
}

fn render_form(frame: &mut Frame, area: Rect, tasks: &TaskCollection) {
    let title = if tasks.mode() == Mode::Create {
        "Create New Task"
    } else {
        "Edit Task"
    };
    let block = pane(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints: Vec<Constraint> = DraftField::ORDER
        .iter()
        .map(|_| Constraint::Length(3))
        .collect();
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(inner);

    let draft = tasks.draft();
    for (idx, field) in DraftField::ORDER.iter().enumerate() {
        let focused = tasks.field() == *field;
        let value = draft.value(*field);
        let text = if field.is_text() {
            Span::styled(value, theme::normal())
        } else {
            Span::styled(format!("\u{25c2} {value} \u{25b8}"), theme::normal())
        };
        let input = Paragraph::new(text).block(
            Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(theme::border(focused)),
        );
        frame.render_widget(input, rows[idx]);
    }

    let footer = match tasks.draft_error() {
        Some(e) => Line::from(Span::styled(e.to_string(), theme::error())),
        None if tasks.is_saving() => Line::from(Span::styled("Saving\u{2026}", theme::dimmed())),
        None if !draft.can_save() => Line::from(Span::styled(
            "A title is required to save",
            theme::dimmed(),
        )),
        None => Line::from(Span::styled(
            "Enter/Ctrl-S: save task  Esc: cancel",
            theme::dimmed(),
        )),
    };
    frame.render_widget(Paragraph::new(footer), rows[DraftField::ORDER.len()]);
}
