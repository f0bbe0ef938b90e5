//! Integration tests for signing in, registering, and signing out.
//!
//! The app is driven through key presses; commands it emits are executed
//! with `net::execute` and the resulting events are fed back, so each test
//! sees the same sequence the live event loop would.
//!
//! These tests validate:
//! - A valid register/login lands on the task screen and persists the token
//! - Server rejections keep the form open with the server's message
//! - Invalid forms never reach the API
//! - A stored token skips the landing screen
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
use taskflow::session::{AuthMode, MemoryTokenStore, Session, TokenStore};
use taskflow::tasks::{TaskCollection, TaskCommand};
use taskflow_stub::server::{StubState, start_server_with_state};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// App on the landing screen plus a handle on its token store.
fn app_with_store(store: MemoryTokenStore) -> (App, Arc<MemoryTokenStore>) {
    let store = Arc::new(store);
    let app = App::new(
        Box::new(Arc::clone(&store)),
        TaskCollection::default(),
        today(),
    );
    (app, store)
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

/// Fills and submits the register form from the landing screen.
fn submit_register(app: &mut App, name: &str, email: &str, password: &str) -> Option<NetCommand> {
    press(app, KeyCode::Char('r'));
    assert_eq!(app.gateway.mode(), AuthMode::Register);
    type_str(app, name);
    press(app, KeyCode::Tab);
    type_str(app, email);
    press(app, KeyCode::Tab);
    type_str(app, password);
    press(app, KeyCode::Enter)
}

/// Fills and submits the login form from the landing screen.
fn submit_login(app: &mut App, email: &str, password: &str) -> Option<NetCommand> {
    press(app, KeyCode::Char('l'));
    assert_eq!(app.gateway.mode(), AuthMode::Login);
    type_str(app, email);
    press(app, KeyCode::Tab);
    type_str(app, password);
    press(app, KeyCode::Enter)
}

// =============================================================================
// In-memory API
// =============================================================================

#[tokio::test]
async fn register_opens_tasks_and_remembers_session() {
    let api = MemoryApi::new();
    let (mut app, store) = app_with_store(MemoryTokenStore::new());

    let cmd = submit_register(&mut app, "Ana", "  Ana@X.com ", "secret1");
    assert!(app.gateway.is_submitting());
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.screen, Screen::Tasks);
    assert!(app.session().is_some());
    assert_eq!(store.load().unwrap().as_ref(), app.session());
    assert_eq!(
        api.calls(),
        vec![
            ApiCall::Register {
                email: "ana@x.com".to_string()
            },
            ApiCall::ListTasks,
        ]
    );
}

#[tokio::test]
async fn wrong_password_stays_on_form_with_server_message() {
    let api = MemoryApi::new();
    api.seed_account("ana@x.com", "secret1");
    let (mut app, store) = app_with_store(MemoryTokenStore::new());

    let cmd = submit_login(&mut app, "ana@x.com", "wrong");
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.screen, Screen::Auth);
    assert_eq!(app.gateway.error_message(), Some("Invalid credentials"));
    assert!(app.session().is_none());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_shows_conflict_message() {
    let api = MemoryApi::new();
    api.seed_account("ana@x.com", "secret1");
    let (mut app, _store) = app_with_store(MemoryTokenStore::new());

    let cmd = submit_register(&mut app, "Ana", "ana@x.com", "other");
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.screen, Screen::Auth);
    assert_eq!(app.gateway.error_message(), Some("User already exists"));
}

#[tokio::test]
async fn invalid_forms_never_reach_the_api() {
    let (mut app, _store) = app_with_store(MemoryTokenStore::new());

    assert!(submit_login(&mut app, "nope", "secret1").is_none());
    assert_eq!(
        app.gateway.error_message(),
        Some("Please enter a valid email address")
    );

    press(&mut app, KeyCode::Esc);
    assert!(submit_login(&mut app, "ana@x.com", "   ").is_none());
    assert_eq!(app.gateway.error_message(), Some("All fields are required"));

    press(&mut app, KeyCode::Esc);
    assert!(submit_register(&mut app, "", "ana@x.com", "secret1").is_none());
    assert_eq!(app.gateway.error_message(), Some("All fields are required"));
}

#[tokio::test]
async fn second_enter_while_submitting_sends_nothing() {
    let (mut app, _store) = app_with_store(MemoryTokenStore::new());

    assert!(submit_login(&mut app, "ana@x.com", "secret1").is_some());
    assert!(press(&mut app, KeyCode::Enter).is_none());
    assert!(app.gateway.is_submitting());
}

#[tokio::test]
async fn unreachable_server_shows_fallback_message() {
    let api = MemoryApi::new();
    api.set_offline(true);
    let (mut app, _store) = app_with_store(MemoryTokenStore::new());

    let cmd = submit_login(&mut app, "ana@x.com", "secret1");
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.screen, Screen::Auth);
    assert_eq!(app.gateway.error_message(), Some("Login failed"));
}

#[tokio::test]
async fn stored_session_skips_landing() {
    let api = MemoryApi::new();
    let session = api.seed_account("ana@x.com", "secret1");
    let (mut app, _store) = app_with_store(MemoryTokenStore::with_session(session));

    let cmd = app.start();
    assert!(matches!(
        cmd,
        Some(NetCommand::Tasks {
            command: TaskCommand::Refresh,
            ..
        })
    ));
    drive(&mut app, &api, cmd).await;

    assert_eq!(app.screen, Screen::Tasks);
    assert_eq!(api.calls(), vec![ApiCall::ListTasks]);
}

#[tokio::test]
async fn sign_out_forgets_session() {
    let (mut app, store) = app_with_store(MemoryTokenStore::with_session(Session::new("tok")));
    app.start();

    press(&mut app, KeyCode::Char('o'));

    assert_eq!(app.screen, Screen::Auth);
    assert_eq!(app.gateway.mode(), AuthMode::Login);
    assert!(app.session().is_none());
    assert!(store.load().unwrap().is_none());
}

// =============================================================================
// HTTP against the stub server
// =============================================================================

/// Starts the stub server in-process and returns a client for it.
async fn start_stub() -> (HttpApi, tokio::task::JoinHandle<()>) {
    let (addr, handle) = start_server_with_state("127.0.0.1:0", Arc::new(StubState::new()))
        .await
        .expect("failed to start stub server");
    let api = HttpApi::new(&format!("http://{addr}"), Some(Duration::from_secs(5)))
        .expect("stub address is a valid URL");
    (api, handle)
}

#[tokio::test]
async fn http_register_then_login() {
    let (api, _handle) = start_stub().await;

    let (mut first, _) = app_with_store(MemoryTokenStore::new());
    let cmd = submit_register(&mut first, "Ana", "ana@x.com", "secret1");
    drive(&mut first, &api, cmd).await;
    assert_eq!(first.screen, Screen::Tasks);
    assert!(first.tasks.tasks().is_empty());

    let (mut second, store) = app_with_store(MemoryTokenStore::new());
    let cmd = submit_login(&mut second, "ANA@x.com", "secret1");
    drive(&mut second, &api, cmd).await;
    assert_eq!(second.screen, Screen::Tasks);
    assert!(store.load().unwrap().is_some());
}

#[tokio::test]
async fn http_rejections_carry_server_messages() {
    let (api, _handle) = start_stub().await;

    let (mut app, _) = app_with_store(MemoryTokenStore::new());
    let cmd = submit_register(&mut app, "Ana", "ana@x.com", "secret1");
    drive(&mut app, &api, cmd).await;

    let (mut dup, _) = app_with_store(MemoryTokenStore::new());
    let cmd = submit_register(&mut dup, "Ana", "ana@x.com", "secret1");
    drive(&mut dup, &api, cmd).await;
    assert_eq!(dup.gateway.error_message(), Some("User already exists"));

    let (mut wrong, _) = app_with_store(MemoryTokenStore::new());
    let cmd = submit_login(&mut wrong, "ana@x.com", "nope");
    drive(&mut wrong, &api, cmd).await;
    assert_eq!(wrong.gateway.error_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn http_unknown_token_lists_nothing() {
    let (api, _handle) = start_stub().await;

    let result = api.list_tasks(&Session::new("forged")).await;
    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.server_message(), Some("Not authorized"));
}
