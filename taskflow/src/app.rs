//! Application state and event handling.
//!
//! `App` owns the screen state machine (landing, login/register, tasks)
//! and turns key presses into state changes plus, where needed, a
//! [`NetCommand`] for the network layer. Results come back through
//! [`App::apply_net_event`]. Nothing in here blocks or awaits.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::net::{NetCommand, NetEvent};
use crate::session::{AuthMode, GatewayOutcome, Session, SessionGateway, TokenStore};
use crate::tasks::{Mode, TaskCollection, TaskCommand};

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Product intro with links to login and register.
    Landing,
    /// Login or register form; the gateway's mode says which.
    Auth,
    /// Task list and detail panes.
    Tasks,
}

/// Which part of the tasks screen receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFocus {
    /// Navigating the list.
    List,
    /// Typing into the search box.
    Search,
}

/// Main application state.
pub struct App {
    /// Current screen.
    pub screen: Screen,
    /// Login/register form state.
    pub gateway: SessionGateway,
    /// Task list, selection, and draft.
    pub tasks: TaskCollection,
    /// Keyboard focus on the tasks screen.
    pub focus: TaskFocus,
    /// Date used for new-task defaults and overdue markers.
    pub today: NaiveDate,
    /// chrono format for due dates.
    pub date_format: String,
    /// Whether the app should quit.
    pub should_quit: bool,
    session: Option<Session>,
    token_store: Box<dyn TokenStore>,
    notice: Option<String>,
    /// Last submit number handed out.
    submits: u64,
    /// Submit whose answer the form is waiting for.
    pending_submit: Option<u64>,
}

/// Shown when a request could not be handed to the network layer.
pub const NETWORK_BUSY: &str = "Network busy, please try again";

impl App {
    /// Creates the app on the landing screen.
    ///
    /// Call [`App::start`] afterwards to pick up a stored session.
    #[must_use]
    pub fn new(token_store: Box<dyn TokenStore>, tasks: TaskCollection, today: NaiveDate) -> Self {
        Self {
            screen: Screen::Landing,
            gateway: SessionGateway::new(AuthMode::Login),
            tasks,
            focus: TaskFocus::List,
            today,
            date_format: "%d/%m/%Y".to_string(),
            should_quit: false,
            session: None,
            token_store,
            notice: None,
            submits: 0,
            pending_submit: None,
        }
    }

    /// Sets the due date display format.
    #[must_use]
    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Opens the tasks screen if a session token is stored.
    ///
    /// Returns the initial list fetch in that case.
    pub fn start(&mut self) -> Option<NetCommand> {
        match self.token_store.load() {
            Ok(Some(session)) => {
                tracing::info!("resuming stored session");
                self.session = Some(session);
                self.enter_tasks()
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session");
                self.notice = Some(format!("Could not read stored session: {e}"));
                None
            }
        }
    }

    /// The active session, if signed in.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// A one-line message for the status bar, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Shows the login or register form with empty fields.
    ///
    /// Any request still in flight for the previous form is forgotten.
    pub fn open_auth(&mut self, mode: AuthMode) {
        self.gateway = SessionGateway::new(mode);
        self.pending_submit = None;
        self.screen = Screen::Auth;
    }

    /// Leaves the form for the landing screen, abandoning any submit.
    fn leave_auth(&mut self) {
        self.gateway = SessionGateway::new(self.gateway.mode());
        self.pending_submit = None;
        self.screen = Screen::Landing;
    }

    /// Opens the tasks screen and requests the list.
    ///
    /// Without a session this redirects to the login form instead.
    pub fn enter_tasks(&mut self) -> Option<NetCommand> {
        if self.session.is_none() {
            self.open_auth(AuthMode::Login);
            return None;
        }
        self.screen = Screen::Tasks;
        self.focus = TaskFocus::List;
        self.task_command(TaskCommand::Refresh)
    }

    /// Clears the stored token and returns to the login form.
    pub fn sign_out(&mut self) {
        if let Err(e) = self.token_store.clear() {
            tracing::warn!(error = %e, "could not clear stored session");
            self.notice = Some(format!("Could not clear stored session: {e}"));
        }
        self.session = None;
        self.tasks.reset();
        tracing::info!("signed out");
        self.open_auth(AuthMode::Login);
    }

    /// Handle a key event.
    ///
    /// Returns a command when the key starts network work.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<NetCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        match self.screen {
            Screen::Landing => {
                self.handle_landing_key(key);
                None
            }
            Screen::Auth => self.handle_auth_key(key),
            Screen::Tasks => match self.tasks.mode() {
                Mode::Create | Mode::Edit => self.handle_form_key(key),
                Mode::View => match self.focus {
                    TaskFocus::List => self.handle_list_key(key),
                    TaskFocus::Search => {
                        self.handle_search_key(key);
                        None
                    }
                },
            },
        }
    }

    /// Applies a network result.
    ///
    /// Returns a follow-up command (the first list fetch after signing in).
    pub fn apply_net_event(&mut self, event: NetEvent) -> Option<NetCommand> {
        match event {
            NetEvent::Authenticated { submit, result } => {
                if self.pending_submit != Some(submit) || !self.gateway.is_submitting() {
                    tracing::debug!(submit, "ignoring authentication result for an abandoned form");
                    return None;
                }
                self.pending_submit = None;
                match self.gateway.complete(result) {
                    GatewayOutcome::Navigate(session) => {
                        if let Err(e) = self.token_store.save(&session) {
                            tracing::warn!(error = %e, "could not persist session");
                            self.notice = Some(format!("Signed in, but not remembered: {e}"));
                        }
                        self.session = Some(session);
                        self.enter_tasks()
                    }
                    GatewayOutcome::Stay(_) => None,
                }
            }
            NetEvent::TasksLoaded { session, tasks } => {
                if self.is_current(&session) {
                    self.tasks.replace_all(tasks);
                }
                None
            }
            NetEvent::Saved { session, id } => {
                if self.is_current(&session) {
                    self.tasks.saved(id.as_ref());
                }
                None
            }
            NetEvent::Toggled {
                session,
                id,
                status,
            } => {
                if self.is_current(&session) {
                    self.tasks.toggled(&id, status);
                }
                None
            }
            NetEvent::Deleted { session, id } => {
                if self.is_current(&session) {
                    self.tasks.deleted(&id);
                }
                None
            }
        }
    }

    /// Undoes the waiting state of a command the network layer never got.
    pub fn command_not_sent(&mut self, cmd: &NetCommand) {
        match cmd {
            NetCommand::Authenticate { submit, .. } => {
                if self.pending_submit == Some(*submit) {
                    self.pending_submit = None;
                    self.gateway.abort(NETWORK_BUSY);
                }
            }
            NetCommand::Tasks { command, .. } => {
                if matches!(command, TaskCommand::Create(_) | TaskCommand::Update { .. }) {
                    self.tasks.save_not_sent();
                }
                self.notice = Some(NETWORK_BUSY.to_string());
            }
            NetCommand::Shutdown => {}
        }
    }

    /// Whether a task event belongs to the signed-in session.
    fn is_current(&self, session: &Session) -> bool {
        let current = self.session.as_ref() == Some(session);
        if !current {
            tracing::debug!("ignoring task event from another session");
        }
        current
    }

    /// Wraps a task command with the current session.
    fn task_command(&mut self, command: TaskCommand) -> Option<NetCommand> {
        let Some(session) = self.session.clone() else {
            self.open_auth(AuthMode::Login);
            return None;
        };
        Some(NetCommand::Tasks { session, command })
    }

    fn handle_landing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('l') | KeyCode::Enter => self.open_auth(AuthMode::Login),
            KeyCode::Char('r') => self.open_auth(AuthMode::Register),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_auth_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('t'), m) if m.contains(KeyModifiers::CONTROL) => {
                let other = match self.gateway.mode() {
                    AuthMode::Login => AuthMode::Register,
                    AuthMode::Register => AuthMode::Login,
                };
                self.open_auth(other);
            }
            (KeyCode::Esc, _) => self.leave_auth(),
            (KeyCode::Tab | KeyCode::Down, _) => self.gateway.focus_next(),
            (KeyCode::BackTab | KeyCode::Up, _) => self.gateway.focus_prev(),
            (KeyCode::Enter, _) => {
                let request = self.gateway.begin_submit().ok()?;
                self.submits += 1;
                self.pending_submit = Some(self.submits);
                return Some(NetCommand::Authenticate {
                    submit: self.submits,
                    request,
                });
            }
            (KeyCode::Backspace, _) => self.gateway.pop_char(),
            (KeyCode::Char(c), _) => self.gateway.push_char(c),
            _ => {}
        }
        None
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.tasks.cursor_down(),
            KeyCode::Up | KeyCode::Char('k') => self.tasks.cursor_up(),
            KeyCode::Enter => {
                self.tasks.select_at_cursor();
            }
            KeyCode::Esc => {
                self.tasks.clear_selection();
            }
            KeyCode::Char(' ' | 'x') => {
                let command = self.tasks.toggle_at_cursor()?;
                return self.task_command(command);
            }
            KeyCode::Char('t') => {
                let id = self.tasks.selected_task()?.id.clone();
                let command = self.tasks.toggle(&id)?;
                return self.task_command(command);
            }
            KeyCode::Char('d') => {
                let id = self.tasks.selected_task()?.id.clone();
                let command = self.tasks.delete(&id);
                return self.task_command(command);
            }
            KeyCode::Char('n') => self.tasks.begin_create(self.today),
            KeyCode::Char('e') => {
                if let Err(e) = self.tasks.begin_edit() {
                    tracing::debug!(error = %e, "edit ignored");
                }
            }
            KeyCode::Char('/') => self.focus = TaskFocus::Search,
            KeyCode::Char('f') | KeyCode::Tab => self.tasks.cycle_filter(),
            KeyCode::Char('r') => return self.task_command(TaskCommand::Refresh),
            KeyCode::Char('o') => self.sign_out(),
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.tasks.clear_query();
                self.focus = TaskFocus::List;
            }
            KeyCode::Enter | KeyCode::Down => self.focus = TaskFocus::List,
            KeyCode::Backspace => self.tasks.pop_query(),
            KeyCode::Char(c) => self.tasks.push_query(c),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        let field = self.tasks.field();
        match (key.code, key.modifiers) {
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => return self.save(),
            (KeyCode::Enter, _) => return self.save(),
            (KeyCode::Esc, _) => self.tasks.cancel(),
            (KeyCode::Tab | KeyCode::Down, _) => self.tasks.next_field(),
            (KeyCode::BackTab | KeyCode::Up, _) => self.tasks.prev_field(),
            (KeyCode::Left | KeyCode::Right, _) if !field.is_text() => {
                self.tasks.cycle_draft_field();
            }
            (KeyCode::Char(' '), _) if !field.is_text() => self.tasks.cycle_draft_field(),
            (KeyCode::Backspace, _) => self.tasks.pop_draft_char(),
            (KeyCode::Char(c), _) => self.tasks.push_draft_char(c),
            _ => {}
        }
        None
    }

    fn save(&mut self) -> Option<NetCommand> {
        match self.tasks.save() {
            Ok(command) => self.task_command(command),
            Err(e) => {
                tracing::debug!(error = %e, "save refused");
                None
            }
        }
    }
}
