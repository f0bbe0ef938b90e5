//! Integration tests for the channel wiring between the TUI loop and the
//! network layer.
//!
//! These tests validate:
//! - `spawn_net` returns working channel handles
//! - A login submitted through the app lands on a populated task screen
//! - A mutation reports its own event before the refetched list
//! - Failed task operations produce no events
//! - Shutdown stops the dispatcher cleanly

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskflow::api::http::HttpApi;
use taskflow::api::memory::MemoryApi;
use taskflow::app::{App, Screen};
use taskflow::net::{self, DEFAULT_CHANNEL_CAPACITY, NetCommand, NetEvent};
use taskflow::session::MemoryTokenStore;
use taskflow::tasks::{TaskCollection, TaskCommand};
use taskflow_proto::task::{NewTask, Priority, Task, TaskId, TaskStatus};
use taskflow_stub::server::{StubState, start_server_with_state};
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(5);

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn task(id: &str, title: &str) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        priority: Priority::Low,
        status: TaskStatus::Todo,
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

async fn next_event(rx: &mut mpsc::Receiver<NetEvent>) -> NetEvent {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timeout waiting for net event")
        .expect("event channel closed unexpectedly")
}

/// Feeds events into the app, forwarding follow-up commands, until `done`.
async fn pump_until(
    app: &mut App,
    tx: &mpsc::Sender<NetCommand>,
    rx: &mut mpsc::Receiver<NetEvent>,
    done: impl Fn(&App) -> bool,
) {
    while !done(app) {
        let event = next_event(rx).await;
        if let Some(cmd) = app.apply_net_event(event) {
            tx.send(cmd).await.expect("net layer stopped");
        }
    }
}

fn login(app: &mut App, email: &str, password: &str) -> NetCommand {
    press(app, KeyCode::Char('l'));
    type_str(app, email);
    press(app, KeyCode::Tab);
    type_str(app, password);
    press(app, KeyCode::Enter).expect("valid form produces a request")
}

#[tokio::test]
async fn login_through_channels_loads_tasks() {
    let api = Arc::new(MemoryApi::new());
    let seeded = api.seed_account("ana@x.com", "secret1");
    api.seed_tasks(&seeded, vec![task("1", "Write report"), task("2", "Review PR")]);

    let (cmd_tx, mut evt_rx) = net::spawn_net(Arc::clone(&api), DEFAULT_CHANNEL_CAPACITY);
    let mut app = App::new(
        Box::new(MemoryTokenStore::new()),
        TaskCollection::default(),
        today(),
    );

    let cmd = login(&mut app, "ana@x.com", "secret1");
    cmd_tx.send(cmd).await.unwrap();
    pump_until(&mut app, &cmd_tx, &mut evt_rx, |app| {
        app.tasks.tasks().len() == 2
    })
    .await;

    assert_eq!(app.screen, Screen::Tasks);
    assert!(app.session().is_some());
}

#[tokio::test]
async fn mutation_event_precedes_refetch() {
    let api = Arc::new(MemoryApi::new());
    let session = api.seed_account("ana@x.com", "secret1");
    let (cmd_tx, mut evt_rx) = net::spawn_net(Arc::clone(&api), 8);

    cmd_tx
        .send(NetCommand::Tasks {
            session: session.clone(),
            command: TaskCommand::Create(NewTask {
                title: "Buy milk".to_string(),
                priority: Priority::High,
                due_date: None,
                description: String::new(),
                status: TaskStatus::Todo,
            }),
        })
        .await
        .unwrap();

    assert!(matches!(
        next_event(&mut evt_rx).await,
        NetEvent::Saved { id: None, .. }
    ));
    match next_event(&mut evt_rx).await {
        NetEvent::TasksLoaded { tasks, .. } => {
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].title, "Buy milk");
        }
        other => panic!("expected TasksLoaded, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_task_operation_is_silent() {
    let api = Arc::new(MemoryApi::new());
    let session = api.seed_account("ana@x.com", "secret1");
    let (cmd_tx, mut evt_rx) = net::spawn_net(Arc::clone(&api), 8);

    // Unknown task: the server answers 404.
    cmd_tx
        .send(NetCommand::Tasks {
            session,
            command: TaskCommand::Delete {
                id: TaskId::new("missing"),
            },
        })
        .await
        .unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(200), evt_rx.recv()).await;
    assert!(waited.is_err(), "no event expected, got {waited:?}");
}

#[tokio::test]
async fn shutdown_stops_dispatcher() {
    let api = Arc::new(MemoryApi::new());
    let (cmd_tx, mut evt_rx) = net::spawn_net(api, 8);

    cmd_tx.send(NetCommand::Shutdown).await.unwrap();

    tokio::time::timeout(WAIT, cmd_tx.closed())
        .await
        .expect("dispatcher should drop its receiver");
    let next = tokio::time::timeout(WAIT, evt_rx.recv())
        .await
        .expect("event channel should close");
    assert!(next.is_none());
}

#[tokio::test]
async fn http_register_and_create_through_channels() {
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", Arc::new(StubState::new()))
        .await
        .expect("failed to start stub server");
    let api = HttpApi::new(&format!("http://{addr}"), Some(WAIT)).unwrap();
    let (cmd_tx, mut evt_rx) = net::spawn_net(Arc::new(api), DEFAULT_CHANNEL_CAPACITY);

    let mut app = App::new(
        Box::new(MemoryTokenStore::new()),
        TaskCollection::default(),
        today(),
    );
    press(&mut app, KeyCode::Char('r'));
    type_str(&mut app, "Ana");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "ana@x.com");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "secret1");
    let cmd = press(&mut app, KeyCode::Enter).unwrap();
    cmd_tx.send(cmd).await.unwrap();
    pump_until(&mut app, &cmd_tx, &mut evt_rx, |app| {
        app.screen == Screen::Tasks
    })
    .await;
    // The initial list fetch.
    let event = next_event(&mut evt_rx).await;
    assert!(matches!(&event, NetEvent::TasksLoaded { tasks, .. } if tasks.is_empty()));
    app.apply_net_event(event);

    press(&mut app, KeyCode::Char('n'));
    type_str(&mut app, "Ship it");
    let cmd = press(&mut app, KeyCode::Enter).unwrap();
    cmd_tx.send(cmd).await.unwrap();
    pump_until(&mut app, &cmd_tx, &mut evt_rx, |app| {
        app.tasks.tasks().len() == 1
    })
    .await;

    assert_eq!(app.tasks.tasks()[0].title, "Ship it");
    cmd_tx.send(NetCommand::Shutdown).await.unwrap();
}
