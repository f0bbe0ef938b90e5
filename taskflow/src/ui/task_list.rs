//! List pane: search box, filter tabs, projected tasks, and footer.

use chrono::NaiveDate;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use taskflow_proto::task::Task;

use super::theme;
use crate::app::{App, TaskFocus};
use crate::tasks::{Mode, StatusFilter};

/// Shown when the projection is empty.
pub const EMPTY_LIST: &str = "No tasks found";

/// Render the list pane.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let [search_area, filter_area, list_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_search(frame, search_area, app);
    render_filters(frame, filter_area, app);
    render_tasks(frame, list_area, app);

    let footer = Paragraph::new(Span::styled(app.tasks.summary().to_string(), theme::dimmed()))
        .centered();
    frame.render_widget(footer, footer_area);
}

fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == TaskFocus::Search && app.tasks.mode() == Mode::View;
    let query = app.tasks.query();
    let text = if query.is_empty() && !focused {
        Span::styled("Search tasks... (/)", theme::placeholder())
    } else {
        Span::styled(query.to_string(), theme::normal())
    };
    let search = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border(focused)),
    );
    frame.render_widget(search, area);
}

fn render_filters(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for filter in StatusFilter::ALL {
        let style = if filter == app.tasks.filter() {
            theme::selected()
        } else {
            theme::dimmed()
        };
        spans.push(Span::styled(format!(" {} ", filter.label()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// One row: checkbox, title, priority badge, and due date.
fn task_line<'a>(task: &'a Task, today: NaiveDate, date_format: &str) -> Line<'a> {
    let done = task.status.is_done();
    let checkbox = if done { "[\u{2713}] " } else { "[ ] " };
    let title_style = if done { theme::done() } else { theme::normal() };

    let mut spans = vec![
        Span::styled(checkbox, theme::dimmed()),
        Span::styled(task.title.as_str(), title_style),
        Span::raw(" "),
        Span::styled(task.priority.to_string(), theme::priority_badge(task.priority)),
    ];
    if let Some(due) = task.due_date {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            super::format_date(due, date_format),
            theme::due_date(task.is_overdue(today)),
        ));
    }
    Line::from(spans)
}

fn render_tasks(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == TaskFocus::List && app.tasks.mode() == Mode::View;
    let block = Block::default()
        .title(Span::styled("TaskFlow", theme::panel_title(theme::LIST_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::border(focused));

    let visible = app.tasks.visible();
    if visible.is_empty() {
        let empty = Paragraph::new(Span::styled(EMPTY_LIST, theme::placeholder()))
            .centered()
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let selected = app.tasks.selected_id();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| {
            let item = ListItem::new(task_line(task, app.today, &app.date_format));
            if selected == Some(&task.id) {
                item.style(theme::highlighted())
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol("> ")
        .highlight_style(if focused {
            theme::selected()
        } else {
            theme::normal()
        });
    let mut state = ListState::default().with_selected(Some(app.tasks.cursor()));
    frame.render_stateful_widget(list, area, &mut state);
}
