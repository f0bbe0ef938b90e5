//! Integration tests for keeping the task list in step with the server.
//!
//! Every accepted mutation is followed by a full refetch, so the list on
//! screen always equals what the server returned last. Failed operations
//! leave the list untouched.
//!
//! These tests validate:
//! - Create, edit, toggle, and delete round-trip through the API
//! - Each mutation is followed by exactly one list fetch
//! - Local validation failures never reach the API
//! - A failed mutation or refresh keeps the previous list
//! - Selection survives refetches by id and clears when the task is gone
//! - The same flows work over HTTP against the stub server

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskflow::api::TaskApi;
use taskflow::api::http::HttpApi;
use taskflow::api::memory::{ApiCall, MemoryApi};
use taskflow::app::{App, Screen};
use taskflow::net::{self, NetCommand};
use taskflow::session::{MemoryTokenStore, Session};
use taskflow::tasks::{Mode, StatusFilter, TaskCollection, TaskError};
use taskflow_proto::auth::RegisterRequest;
use taskflow_proto::task::{Priority, Task, TaskId, TaskPatch, TaskStatus};
use taskflow_stub::server::{StubState, start_server_with_state};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn task(id: &str, title: &str, status: TaskStatus) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        priority: Priority::Medium,
        status,
        description: None,
        due_date: None,
    }
}

fn press(app: &mut App, code: KeyCode) -> Option<NetCommand> {
    app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Runs `cmd` and every follow-up command until the app goes quiet.
async fn drive<A: TaskApi>(app: &mut App, api: &A, cmd: Option<NetCommand>) {
    let mut pending: Vec<NetCommand> = cmd.into_iter().collect();
    while let Some(cmd) = pending.pop() {
        for event in net::execute(api, cmd).await {
            if let Some(next) = app.apply_net_event(event) {
                pending.push(next);
            }
        }
    }
}

/// Signed-in app whose account already owns `tasks`; the initial fetch
/// has completed and the call log is cleared.
async fn signed_in(api: &MemoryApi, tasks: Vec<Task>) -> App {
    let session = api.seed_account("ana@x.com", "secret1");
    api.seed_tasks(&session, tasks);
    let mut app = App::new(
        Box::new(MemoryTokenStore::with_session(session)),
        TaskCollection::default(),
        today(),
    );
    let cmd = app.start();
    drive(&mut app, api, cmd).await;
    assert_eq!(app.screen, Screen::Tasks);
    api.clear_calls();
    app
}

fn titles(app: &App) -> Vec<String> {
    app.tasks.tasks().iter().map(|t| t.title.clone()).collect()
}

// =============================================================================
// In-memory API
// =============================================================================

#[tokio::test]
async fn initial_fetch_shows_server_list() {
    let api = MemoryApi::new();
    let app = signed_in(
        &api,
        vec![
            task("1", "Write report", TaskStatus::Todo),
            task("2", "Review PR", TaskStatus::Done),
        ],
    )
    .await;

    assert_eq!(titles(&app), ["Write report", "Review PR"]);
    assert_eq!(app.tasks.summary().total, 2);
    assert_eq!(app.tasks.summary().completed, 1);
}

#[tokio::test]
async fn create_posts_draft_then_refetches() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, Vec::new()).await;

    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.tasks.mode(), Mode::Create);
    type_str(&mut app, "Buy milk");
    let cmd = press(&mut app, KeyCode::Enter);
    assert!(cmd.is_some());
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.tasks.mode(), Mode::View);
    assert_eq!(titles(&app), ["Buy milk"]);
    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        ApiCall::CreateTask(body) => {
            assert_eq!(body.title, "Buy milk");
            assert_eq!(body.priority, Priority::Medium);
            assert_eq!(body.status, TaskStatus::Todo);
            assert_eq!(body.due_date, Some(today()));
        }
        other => panic!("expected create, got {other:?}"),
    }
    assert_eq!(calls[1], ApiCall::ListTasks);
}

#[tokio::test]
async fn blank_title_is_rejected_locally() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, Vec::new()).await;

    press(&mut app, KeyCode::Char('n'));
    type_str(&mut app, "   ");
    assert!(press(&mut app, KeyCode::Enter).is_none());

    assert_eq!(app.tasks.mode(), Mode::Create);
    assert_eq!(app.tasks.draft_error(), Some(&TaskError::TitleEmpty));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn cancel_discards_draft_without_requests() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, vec![task("1", "Write report", TaskStatus::Todo)]).await;

    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('e'));
    type_str(&mut app, " changed");
    press(&mut app, KeyCode::Esc);

    assert_eq!(app.tasks.mode(), Mode::View);
    assert_eq!(app.tasks.draft().title, "Write report");
    assert_eq!(titles(&app), ["Write report"]);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn edit_sends_full_patch_and_keeps_selection() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, vec![task("1", "Write report", TaskStatus::Todo)]).await;

    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('e'));
    assert_eq!(app.tasks.mode(), Mode::Edit);
    type_str(&mut app, " v2");
    let cmd = press(&mut app, KeyCode::Enter);
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.tasks.mode(), Mode::View);
    assert_eq!(titles(&app), ["Write report v2"]);
    assert_eq!(app.tasks.selected_id(), Some(&TaskId::new("1")));
    let calls = api.calls();
    match &calls[0] {
        ApiCall::UpdateTask(id, patch) => {
            assert_eq!(id, &TaskId::new("1"));
            assert_eq!(patch.title.as_deref(), Some("Write report v2"));
            assert_eq!(patch.due_date, Some(None));
            assert_eq!(patch.status, Some(TaskStatus::Todo));
        }
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(calls[1], ApiCall::ListTasks);
}

#[tokio::test]
async fn toggle_flips_status_at_cursor() {
    let api = MemoryApi::new();
    let mut app = signed_in(
        &api,
        vec![
            task("1", "Write report", TaskStatus::Todo),
            task("2", "Review PR", TaskStatus::Done),
        ],
    )
    .await;

    let cmd = press(&mut app, KeyCode::Char(' '));
    drive(&mut app, &api, cmd).await;
    assert_eq!(app.tasks.tasks()[0].status, TaskStatus::Done);

    press(&mut app, KeyCode::Down);
    let cmd = press(&mut app, KeyCode::Char('x'));
    drive(&mut app, &api, cmd).await;
    assert_eq!(app.tasks.tasks()[1].status, TaskStatus::Todo);

    assert_eq!(
        api.calls(),
        vec![
            ApiCall::UpdateTask(TaskId::new("1"), TaskPatch::status(TaskStatus::Done)),
            ApiCall::ListTasks,
            ApiCall::UpdateTask(TaskId::new("2"), TaskPatch::status(TaskStatus::Todo)),
            ApiCall::ListTasks,
        ]
    );
}

#[tokio::test]
async fn toggling_in_progress_completes_it() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, vec![task("1", "Write report", TaskStatus::InProgress)]).await;

    press(&mut app, KeyCode::Enter);
    let cmd = press(&mut app, KeyCode::Char('t'));
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.tasks.tasks()[0].status, TaskStatus::Done);
    assert_eq!(app.tasks.draft().status, TaskStatus::Done);
}

#[tokio::test]
async fn delete_selected_clears_detail_pane() {
    let api = MemoryApi::new();
    let mut app = signed_in(
        &api,
        vec![
            task("1", "Write report", TaskStatus::Todo),
            task("2", "Review PR", TaskStatus::Done),
        ],
    )
    .await;

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.tasks.selected_id(), Some(&TaskId::new("1")));
    let cmd = press(&mut app, KeyCode::Char('d'));
    drive(&mut app, &api, cmd).await;

    assert!(app.tasks.selected_task().is_none());
    assert_eq!(titles(&app), ["Review PR"]);
    assert_eq!(
        api.calls(),
        vec![ApiCall::DeleteTask(TaskId::new("1")), ApiCall::ListTasks]
    );
}

#[tokio::test]
async fn delete_without_selection_does_nothing() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, vec![task("1", "Write report", TaskStatus::Todo)]).await;

    assert!(press(&mut app, KeyCode::Char('d')).is_none());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn failed_mutation_keeps_list() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, vec![task("1", "Write report", TaskStatus::Todo)]).await;

    api.set_offline(true);
    let cmd = press(&mut app, KeyCode::Char(' '));
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.tasks.tasks()[0].status, TaskStatus::Todo);
    // No refetch after a failure.
    assert_eq!(
        api.calls(),
        vec![ApiCall::UpdateTask(
            TaskId::new("1"),
            TaskPatch::status(TaskStatus::Done)
        )]
    );
}

#[tokio::test]
async fn failed_refresh_keeps_list() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, vec![task("1", "Write report", TaskStatus::Todo)]).await;

    api.set_offline(true);
    let cmd = press(&mut app, KeyCode::Char('r'));
    drive(&mut app, &api, cmd).await;

    assert_eq!(titles(&app), ["Write report"]);
}

#[tokio::test]
async fn refresh_drops_vanished_selection() {
    let api = MemoryApi::new();
    let session = api.seed_account("ana@x.com", "secret1");
    api.seed_tasks(
        &session,
        vec![
            task("1", "Write report", TaskStatus::Todo),
            task("2", "Review PR", TaskStatus::Done),
        ],
    );
    let mut app = App::new(
        Box::new(MemoryTokenStore::with_session(session.clone())),
        TaskCollection::default(),
        today(),
    );
    let cmd = app.start();
    drive(&mut app, &api, cmd).await;

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.tasks.selected_id(), Some(&TaskId::new("2")));

    // Another client deletes the selected task.
    api.seed_tasks(&session, vec![task("1", "Write report", TaskStatus::Todo)]);
    let cmd = press(&mut app, KeyCode::Char('r'));
    drive(&mut app, &api, cmd).await;

    assert!(app.tasks.selected_task().is_none());
    assert_eq!(app.tasks.cursor(), 0);
}

#[tokio::test]
async fn search_and_filter_narrow_the_view_only() {
    let api = MemoryApi::new();
    let mut app = signed_in(
        &api,
        vec![
            task("1", "Write report", TaskStatus::Todo),
            task("2", "Review PR", TaskStatus::Done),
            task("3", "report bug", TaskStatus::InProgress),
        ],
    )
    .await;

    press(&mut app, KeyCode::Char('/'));
    type_str(&mut app, "REP");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.tasks.visible().len(), 2);

    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.tasks.filter(), StatusFilter::Active);
    assert_eq!(app.tasks.visible().len(), 2);

    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.tasks.filter(), StatusFilter::Completed);
    assert!(app.tasks.visible().is_empty());

    assert_eq!(app.tasks.tasks().len(), 3);
    assert!(api.calls().is_empty());
}

fn shown_under(app: &mut App, filter: StatusFilter) -> Vec<String> {
    app.tasks.set_filter(filter);
    app.tasks.visible().iter().map(|t| t.title.clone()).collect()
}

#[tokio::test]
async fn new_task_moves_from_active_to_completed() {
    let api = MemoryApi::new();
    let mut app = signed_in(&api, Vec::new()).await;

    press(&mut app, KeyCode::Char('n'));
    type_str(&mut app, "Ship release");
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.tasks.draft().priority, Priority::High);
    let cmd = press(&mut app, KeyCode::Enter);
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.tasks.mode(), Mode::View);
    assert_eq!(app.tasks.tasks()[0].priority, Priority::High);
    assert_eq!(shown_under(&mut app, StatusFilter::All), ["Ship release"]);
    assert_eq!(shown_under(&mut app, StatusFilter::Active), ["Ship release"]);
    assert!(shown_under(&mut app, StatusFilter::Completed).is_empty());

    app.tasks.set_filter(StatusFilter::All);
    let cmd = press(&mut app, KeyCode::Char(' '));
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.tasks.tasks()[0].status, TaskStatus::Done);
    assert_eq!(shown_under(&mut app, StatusFilter::Completed), ["Ship release"]);
    assert_eq!(shown_under(&mut app, StatusFilter::All), ["Ship release"]);
    assert_eq!(app.tasks.summary().completed, 1);
    assert!(shown_under(&mut app, StatusFilter::Active).is_empty());
}

// =============================================================================
// HTTP against the stub server
// =============================================================================

#[tokio::test]
async fn http_full_task_lifecycle() {
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", Arc::new(StubState::new()))
        .await
        .expect("failed to start stub server");
    let api = HttpApi::new(&format!("http://{addr}"), Some(Duration::from_secs(5)))
        .expect("stub address is a valid URL");

    let session: Session = api
        .register(&RegisterRequest {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .expect("register");

    let mut app = App::new(
        Box::new(MemoryTokenStore::with_session(session)),
        TaskCollection::default(),
        today(),
    );
    let cmd = app.start();
    drive(&mut app, &api, cmd).await;
    assert!(app.tasks.tasks().is_empty());

    for title in ["Write report", "Review PR"] {
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, title);
        let cmd = press(&mut app, KeyCode::Enter);
        drive(&mut app, &api, cmd).await;
    }
    assert_eq!(titles(&app), ["Write report", "Review PR"]);
    assert_eq!(app.tasks.tasks()[0].due_date, Some(today()));

    // Toggle the first task.
    let cmd = press(&mut app, KeyCode::Char(' '));
    drive(&mut app, &api, cmd).await;
    assert_eq!(app.tasks.tasks()[0].status, TaskStatus::Done);

    // Edit the second task's title.
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('e'));
    type_str(&mut app, "s");
    let cmd = press(&mut app, KeyCode::Enter);
    drive(&mut app, &api, cmd).await;
    assert_eq!(titles(&app), ["Write report", "Review PRs"]);

    // Delete it.
    let cmd = press(&mut app, KeyCode::Char('d'));
    drive(&mut app, &api, cmd).await;
    assert_eq!(titles(&app), ["Write report"]);
    assert!(app.tasks.selected_task().is_none());
}
