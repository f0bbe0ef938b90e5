//! `TaskFlow`: terminal client for a task-management REST API.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskflow/config.toml`).
//!
//! ```bash
//! # Against a local development server
//! cargo run --bin taskflow-stub &
//! cargo run --bin taskflow -- --api-url http://127.0.0.1:5000
//!
//! # Or via environment variables
//! TASKFLOW_API_URL=https://tasks.example.com cargo run --bin taskflow
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskflow::api::http::HttpApi;
use taskflow::app::App;
use taskflow::config::{CliArgs, ClientConfig};
use taskflow::net::{self, NetCommand, NetEvent};
use taskflow::session::{FileTokenStore, MemoryTokenStore, TokenStore};
use taskflow::tasks::TaskCollection;
use taskflow::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::from_cli(&cli)
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(api_url = %config.api_url, "taskflow starting");

    let api = match HttpApi::new(&config.api_url, config.request_timeout) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    let token_store = open_token_store(&config);

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, api, token_store, &config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskflow exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskflow.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Picks the on-disk token file, or memory when persistence is off or
/// no data directory exists.
fn open_token_store(config: &ClientConfig) -> Box<dyn TokenStore> {
    if !config.persist_session {
        return Box::new(MemoryTokenStore::new());
    }
    match config.resolved_token_dir() {
        Ok(dir) => {
            let store = FileTokenStore::in_dir(&dir);
            tracing::debug!(path = %store.path().display(), "using token file");
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "session will not be remembered");
            Box::new(MemoryTokenStore::new())
        }
    }
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: Arc<HttpApi>,
    token_store: Box<dyn TokenStore>,
    config: &ClientConfig,
) -> io::Result<()> {
    let today = chrono::Local::now().date_naive();
    let mut app = App::new(token_store, TaskCollection::new(config.max_title_len), today)
        .with_date_format(&config.date_format);

    let (cmd_tx, mut evt_rx) = net::spawn_net(api, config.channel_capacity);

    if let Some(cmd) = app.start() {
        dispatch(&mut app, &cmd_tx, cmd);
    }

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending NetEvents (non-blocking).
        drain_net_events(&mut app, &mut evt_rx, &cmd_tx);

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(cmd) = app.handle_key_event(key) {
                dispatch(&mut app, &cmd_tx, cmd);
            }
        }

        if app.should_quit {
            // Send shutdown command to networking tasks.
            let _ = cmd_tx.try_send(NetCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Hands a command to the network layer without blocking the UI thread.
///
/// A command that cannot be queued is handed back to the app so the
/// form waiting on it unlocks.
fn dispatch(app: &mut App, tx: &mpsc::Sender<NetCommand>, cmd: NetCommand) {
    match tx.try_send(cmd) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(cmd)) => {
            tracing::warn!(?cmd, "network busy, command dropped");
            app.command_not_sent(&cmd);
        }
        Err(mpsc::error::TrySendError::Closed(cmd)) => {
            tracing::error!("network layer stopped");
            app.command_not_sent(&cmd);
        }
    }
}

/// Drain all pending `NetEvent`s from the receiver and apply them to the app.
fn drain_net_events(
    app: &mut App,
    rx: &mut mpsc::Receiver<NetEvent>,
    tx: &mpsc::Sender<NetCommand>,
) {
    while let Ok(event) = rx.try_recv() {
        if let Some(cmd) = app.apply_net_event(event) {
            dispatch(app, tx, cmd);
        }
    }
}
