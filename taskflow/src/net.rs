//! Networking coordinator between the TUI event loop and the API client.
//!
//! The main thread sends [`NetCommand`]s and drains [`NetEvent`]s on each
//! tick of its poll loop. Every command runs in its own tokio task, so
//! mutations never wait on each other and overlapping list fetches land
//! in completion order.
//!
//! ```text
//! TUI (main thread)  ←── NetEvent ───  tokio task per command
//!                     ─── NetCommand →
//! ```
//!
//! A successful mutation reports its own event followed by a fresh
//! [`NetEvent::TasksLoaded`]. Failed task operations are logged and
//! produce no event; the screen keeps its current list.
//!
//! Every event names what it answers: the submit number for a login or
//! register, the session for task events. Results that arrive after the
//! user has moved on are recognized and dropped by the receiver.

use std::sync::Arc;

use taskflow_proto::task::{Task, TaskId, TaskPatch, TaskStatus};
use tokio::sync::mpsc;

use crate::api::{ApiError, TaskApi};
use crate::session::{AuthRequest, Session};
use crate::tasks::TaskCommand;

/// Default channel capacity for commands and events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Commands sent from the TUI main loop to the network layer.
#[derive(Debug, Clone)]
pub enum NetCommand {
    /// Submit validated credentials.
    Authenticate {
        /// Submit number, echoed in [`NetEvent::Authenticated`].
        submit: u64,
        /// Login or register body.
        request: AuthRequest,
    },
    /// Run a task operation on behalf of `session`.
    Tasks {
        /// Token the request is made with.
        session: Session,
        /// What to do.
        command: TaskCommand,
    },
    /// Stop accepting commands. Requests already running still finish.
    Shutdown,
}

/// Events sent from the network layer back to the TUI main loop.
#[derive(Debug)]
pub enum NetEvent {
    /// A login or register request completed.
    Authenticated {
        /// Submit number from the originating command.
        submit: u64,
        /// Session on success.
        result: Result<Session, ApiError>,
    },
    /// A fresh copy of the full task list.
    TasksLoaded {
        /// Session the list was fetched with.
        session: Session,
        /// Every task the server returned.
        tasks: Vec<Task>,
    },
    /// A create (`id = None`) or edit (`id = Some`) was accepted.
    Saved {
        /// Session the request was made with.
        session: Session,
        /// Task that was edited; `None` for a create.
        id: Option<TaskId>,
    },
    /// A status toggle was accepted.
    Toggled {
        /// Session the request was made with.
        session: Session,
        /// Toggled task.
        id: TaskId,
        /// Status now stored on the server.
        status: TaskStatus,
    },
    /// A delete was accepted.
    Deleted {
        /// Session the request was made with.
        session: Session,
        /// Deleted task.
        id: TaskId,
    },
}

/// Spawns the command dispatcher and returns its channel handles.
///
/// Must be called from within a tokio runtime. The dispatcher exits on
/// [`NetCommand::Shutdown`] or when the command sender is dropped.
/// A `capacity` of zero is raised to one.
pub fn spawn_net<A>(
    api: Arc<A>,
    capacity: usize,
) -> (mpsc::Sender<NetCommand>, mpsc::Receiver<NetEvent>)
where
    A: TaskApi + 'static,
{
    let capacity = capacity.max(1);
    let (cmd_tx, cmd_rx) = mpsc::channel::<NetCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<NetEvent>(capacity);

    tokio::spawn(async move {
        command_handler(api, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx)
}

/// Background task: spawn one worker per command.
async fn command_handler<A>(
    api: Arc<A>,
    mut cmd_rx: mpsc::Receiver<NetCommand>,
    evt_tx: mpsc::Sender<NetEvent>,
) where
    A: TaskApi + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        if matches!(cmd, NetCommand::Shutdown) {
            tracing::info!("net command handler shutting down");
            break;
        }

        let api = Arc::clone(&api);
        let evt_tx = evt_tx.clone();
        tokio::spawn(async move {
            for event in execute(api.as_ref(), cmd).await {
                if evt_tx.send(event).await.is_err() {
                    // TUI dropped; nobody is listening.
                    break;
                }
            }
        });
    }
}

/// Runs one command to completion and returns the events it produced.
///
/// Exposed so tests can drive the protocol without channels.
pub async fn execute<A: TaskApi>(api: &A, cmd: NetCommand) -> Vec<NetEvent> {
    match cmd {
        NetCommand::Authenticate { submit, request } => {
            let result = match &request {
                AuthRequest::Login(req) => api.login(req).await,
                AuthRequest::Register(req) => api.register(req).await,
            };
            vec![NetEvent::Authenticated { submit, result }]
        }
        NetCommand::Tasks { session, command } => run_task_command(api, &session, command).await,
        NetCommand::Shutdown => Vec::new(),
    }
}

async fn run_task_command<A: TaskApi>(
    api: &A,
    session: &Session,
    command: TaskCommand,
) -> Vec<NetEvent> {
    let outcome = match command {
        TaskCommand::Refresh => return refetch(api, session).await.into_iter().collect(),
        TaskCommand::Create(body) => api
            .create_task(session, &body)
            .await
            .map(|()| NetEvent::Saved {
                session: session.clone(),
                id: None,
            })
            .map_err(|e| ("create", e)),
        TaskCommand::Update { id, patch } => api
            .update_task(session, &id, &patch)
            .await
            .map(|()| NetEvent::Saved {
                session: session.clone(),
                id: Some(id),
            })
            .map_err(|e| ("update", e)),
        TaskCommand::Toggle { id, status } => api
            .update_task(session, &id, &TaskPatch::status(status))
            .await
            .map(|()| NetEvent::Toggled {
                session: session.clone(),
                id,
                status,
            })
            .map_err(|e| ("toggle", e)),
        TaskCommand::Delete { id } => api
            .delete_task(session, &id)
            .await
            .map(|()| NetEvent::Deleted {
                session: session.clone(),
                id,
            })
            .map_err(|e| ("delete", e)),
    };

    match outcome {
        Ok(event) => {
            let mut events = vec![event];
            events.extend(refetch(api, session).await);
            events
        }
        Err((op, error)) => {
            tracing::warn!(op, %error, "task operation failed");
            Vec::new()
        }
    }
}

async fn refetch<A: TaskApi>(api: &A, session: &Session) -> Option<NetEvent> {
    match api.list_tasks(session).await {
        Ok(tasks) => Some(NetEvent::TasksLoaded {
            session: session.clone(),
            tasks,
        }),
        Err(error) => {
            tracing::warn!(%error, "fetching tasks failed; keeping current list");
            None
        }
    }
}
