//! TUI session state.
//!
//! `App` holds the registry snapshot, the derived visible list and the view
//! state. Intents from the keyboard become reducer actions plus, when the
//! outside world is involved, an [`Effect`] for the event loop to carry out.

use std::time::{Duration, Instant};

use portpatrol_core::{Action, Direction, Error, PortProcess, Settings, ViewMode, ViewState};

use super::input::Intent;

/// Bottom-bordered header: title line plus border.
const HEADER_HEIGHT: u16 = 2;
/// Extra header line showing the active filter.
const FILTER_LINE_HEIGHT: u16 = 1;
/// Search box line plus border.
const SEARCH_HEIGHT: u16 = 2;
/// Top-bordered status bar.
const STATUS_HEIGHT: u16 = 2;
/// Column titles plus a spacer line.
const LIST_HEADER_HEIGHT: u16 = 2;
/// One line above and one below the rows.
const SCROLL_INDICATOR_HEIGHT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

/// Transient status bar message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
    expires_at: Instant,
}

/// A termination the event loop should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillRequest {
    pub pid: u32,
    pub port: u16,
    pub force: bool,
    /// Sent with the quick force-kill key, without the confirmation modal.
    pub quick: bool,
}

/// Side effect requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Refresh,
    Kill(KillRequest),
    Inspect { pid: u32 },
}

pub struct App {
    entities: Vec<PortProcess>,
    visible: Vec<PortProcess>,
    view: ViewState,
    height: u16,
    loading: bool,
    should_quit: bool,

    kill_target: Option<PortProcess>,
    kill_force: bool,
    inspected: Option<PortProcess>,
    details: String,

    message: Option<StatusMessage>,
    pending_refresh: Option<Instant>,
    refresh_delay: Duration,
    message_timeout: Duration,
    home: Option<String>,
}

impl App {
    pub fn new(initial_port: Option<u16>, settings: &Settings, height: u16) -> Self {
        Self {
            entities: Vec::new(),
            visible: Vec::new(),
            view: ViewState::new(initial_port),
            height,
            loading: true,
            should_quit: false,
            kill_target: None,
            kill_force: false,
            inspected: None,
            details: String::new(),
            message: None,
            pending_refresh: None,
            refresh_delay: settings.refresh_delay(),
            message_timeout: settings.message_timeout(),
            home: dirs::home_dir().map(|p| p.to_string_lossy().into_owned()),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn visible(&self) -> &[PortProcess] {
        &self.visible
    }

    pub fn selected(&self) -> Option<&PortProcess> {
        self.view.selected(&self.visible)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn kill_target(&self) -> Option<&PortProcess> {
        self.kill_target.as_ref()
    }

    pub fn kill_force(&self) -> bool {
        self.kill_force
    }

    pub fn inspected(&self) -> Option<&PortProcess> {
        self.inspected.as_ref()
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn home(&self) -> Option<&str> {
        self.home.as_deref()
    }

    pub fn header_height(&self) -> u16 {
        if self.view.search_query.is_empty() {
            HEADER_HEIGHT
        } else {
            HEADER_HEIGHT + FILTER_LINE_HEIGHT
        }
    }

    pub fn search_height(&self) -> u16 {
        if self.view.view_mode == ViewMode::Search {
            SEARCH_HEIGHT
        } else {
            0
        }
    }

    pub fn status_height(&self) -> u16 {
        STATUS_HEIGHT
    }

    /// Rows available to the list before scroll indicators are accounted for.
    fn base_capacity(&self) -> usize {
        let chrome = self.header_height() + self.search_height() + STATUS_HEIGHT + LIST_HEADER_HEIGHT;
        usize::from(self.height.saturating_sub(chrome)).max(1)
    }

    /// Whether the list is longer than the window.
    pub fn show_scroll_indicators(&self) -> bool {
        self.visible.len() > self.base_capacity()
    }

    /// Number of entity rows that fit on screen.
    pub fn max_visible(&self) -> usize {
        let base = self.base_capacity();
        if self.show_scroll_indicators() {
            base.saturating_sub(SCROLL_INDICATOR_HEIGHT).max(1)
        } else {
            base
        }
    }

    /// Replace the snapshot after a scan.
    pub fn set_entities(&mut self, entities: Vec<PortProcess>) {
        self.entities = entities;
        self.loading = false;
        self.recompute();
    }

    pub fn resize(&mut self, height: u16) {
        self.height = height;
        self.recompute();
    }

    /// Show a message until `message_timeout` has passed.
    pub fn notify(&mut self, text: impl Into<String>, kind: MessageKind, now: Instant) {
        self.message = Some(StatusMessage {
            text: text.into(),
            kind,
            expires_at: now + self.message_timeout,
        });
    }

    /// Expire the status message. Returns true when the delayed refresh is
    /// due; the pending refresh is consumed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.message.as_ref().is_some_and(|m| now >= m.expires_at) {
            self.message = None;
        }

        match self.pending_refresh {
            Some(at) if now >= at => {
                self.pending_refresh = None;
                true
            }
            _ => false,
        }
    }

    /// How long the event loop may block on input: the tick rate, cut short
    /// by a pending refresh deadline.
    pub fn poll_timeout(&self, now: Instant, tick_rate: Duration) -> Duration {
        match self.pending_refresh {
            Some(at) => tick_rate.min(at.saturating_duration_since(now)),
            None => tick_rate,
        }
    }

    /// A manual rescan is starting.
    pub fn begin_refresh(&mut self, now: Instant) {
        self.notify("Scanning ports...", MessageKind::Info, now);
    }

    /// A manual rescan finished with `entities`.
    pub fn refresh_finished(&mut self, entities: Vec<PortProcess>, now: Instant) {
        self.set_entities(entities);
        self.notify("Refreshed", MessageKind::Success, now);
    }

    /// Record the outcome of a kill request.
    pub fn kill_finished(&mut self, request: KillRequest, result: Result<(), Error>, now: Instant) {
        match result {
            Ok(()) => {
                let text = if request.quick {
                    format!("Force killed {} (port {})", request.pid, request.port)
                } else {
                    format!("Killed process {} (port {})", request.pid, request.port)
                };
                self.notify(text, MessageKind::Success, now);
                // A later kill replaces an earlier pending refresh.
                self.pending_refresh = Some(now + self.refresh_delay);
            }
            Err(err) => self.notify(err.reason(), MessageKind::Error, now),
        }
    }

    /// Store the detail dump fetched for the Details view.
    pub fn set_details(&mut self, pid: u32, details: String) {
        if self.inspected.as_ref().is_some_and(|p| p.pid == pid) {
            self.details = details;
        }
    }

    /// Apply an intent and return the effect the event loop should run.
    pub fn apply(&mut self, intent: Intent) -> Effect {
        match intent {
            Intent::Quit => {
                self.should_quit = true;
                return Effect::Quit;
            }
            Intent::MoveUp => self.navigate(Direction::Up),
            Intent::MoveDown => self.navigate(Direction::Down),
            Intent::JumpTop => self.dispatch(Action::JumpTop),
            Intent::JumpBottom => {
                let (list_len, max_visible) = (self.visible.len(), self.max_visible());
                self.dispatch(Action::JumpBottom {
                    list_len,
                    max_visible,
                });
            }
            Intent::StartSearch => self.dispatch(Action::SetViewMode(ViewMode::Search)),
            Intent::AppendSearch(c) => self.dispatch(Action::AppendSearchChar(c)),
            Intent::BackspaceSearch => self.dispatch(Action::BackspaceSearch),
            Intent::EndSearch => self.dispatch(Action::SetViewMode(ViewMode::List)),
            Intent::CancelSearch => {
                if self.view.search_query.is_empty() {
                    self.dispatch(Action::SetViewMode(ViewMode::List));
                } else {
                    self.dispatch(Action::ClearSearch);
                }
            }
            Intent::ClearFilter => {
                if !self.view.search_query.is_empty() {
                    self.dispatch(Action::ClearSearch);
                }
            }
            Intent::OpenKillConfirm => {
                if let Some(target) = self.selected().cloned() {
                    self.kill_target = Some(target);
                    self.kill_force = false;
                    self.dispatch(Action::SetViewMode(ViewMode::KillConfirm));
                }
            }
            Intent::ConfirmKill => {
                self.dispatch(Action::SetViewMode(ViewMode::List));
                if let Some(target) = self.kill_target.take() {
                    return Effect::Kill(KillRequest {
                        pid: target.pid,
                        port: target.port,
                        force: self.kill_force,
                        quick: false,
                    });
                }
            }
            Intent::CancelKill => {
                self.kill_target = None;
                self.dispatch(Action::SetViewMode(ViewMode::List));
            }
            Intent::ToggleForce => self.kill_force = !self.kill_force,
            Intent::ForceKill => {
                if let Some(target) = self.selected() {
                    return Effect::Kill(KillRequest {
                        pid: target.pid,
                        port: target.port,
                        force: true,
                        quick: true,
                    });
                }
            }
            Intent::Refresh => return Effect::Refresh,
            Intent::ToggleSortField => self.dispatch(Action::ToggleSortField),
            Intent::ToggleSortOrder => self.dispatch(Action::ToggleSortOrder),
            Intent::OpenHelp => self.dispatch(Action::SetViewMode(ViewMode::Help)),
            Intent::OpenDetails => {
                if let Some(target) = self.selected().cloned() {
                    let pid = target.pid;
                    self.inspected = Some(target);
                    self.details.clear();
                    self.dispatch(Action::SetViewMode(ViewMode::Details));
                    return Effect::Inspect { pid };
                }
            }
            Intent::CloseModal => {
                self.inspected = None;
                self.details.clear();
                self.dispatch(Action::SetViewMode(ViewMode::List));
            }
        }
        Effect::None
    }

    fn navigate(&mut self, direction: Direction) {
        let (list_len, max_visible) = (self.visible.len(), self.max_visible());
        self.dispatch(Action::Navigate {
            direction,
            list_len,
            max_visible,
        });
    }

    fn dispatch(&mut self, action: Action) {
        self.view = std::mem::take(&mut self.view).reduce(action);
        self.recompute();
    }

    /// Rebuild the visible list and pull the selection back into range.
    fn recompute(&mut self) {
        self.visible = self.view.visible(&self.entities);
        let (list_len, max_visible) = (self.visible.len(), self.max_visible());
        self.view = std::mem::take(&mut self.view).reduce(Action::Clamp {
            list_len,
            max_visible,
        });
    }
}
