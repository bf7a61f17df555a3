//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI, and
//! translates keyboard events into `core::Action` values. This is the only
//! module that knows about ratatui and crossterm.
//!
//! ## Loop shape
//!
//! The event loop owns `App` and is the only caller of `update`. Network
//! calls, the reveal ticker, and the "threads changed" subscription run as
//! tokio tasks that send `Action`s back through an `mpsc` channel drained
//! once per iteration. Effects returned by the reducer are executed here:
//! spawning an exchange, starting a reveal ticker, fetching the thread
//! list, publishing the broadcast.
//!
//! ## Redraw strategy
//!
//! Conditional redraw: while something animates (loader, reveal) the loop
//! polls at ~12fps; idle, it sleeps up to 500ms and redraws only on events
//! or incoming actions.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use log::{debug, info, warn};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::{HttpBackend, ThreadBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::broadcast::ThreadsChangedBus;
use crate::core::config::ResolvedConfig;
use crate::core::reveal::REVEAL_INTERVAL;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    InputBox, InputEvent, SearchEvent, SearchState, SidebarEvent, SidebarState, TranscriptState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which region receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub sidebar: SidebarState,
    pub transcript: TranscriptState,
    pub input: InputBox,
    /// Search overlay (None = hidden)
    pub search: Option<SearchState>,
    pub focus: Focus,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            sidebar: SidebarState::new(),
            transcript: TranscriptState::new(),
            input: InputBox::new(),
            search: None,
            focus: Focus::Input, // User expects to type immediately
        }
    }

    pub fn sidebar_focused(&self) -> bool {
        self.focus == Focus::Sidebar
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste, Hide);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn ThreadBackend> = Arc::new(HttpBackend::new(
        config.base_url.clone(),
        config.session_cookie.clone(),
        config.request_timeout_secs,
    ));
    let mut app = App::new(backend);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // Decoupled thread-list invalidation: the exchange path publishes, this
    // subscription re-fetches.
    let bus = ThreadsChangedBus::new();
    spawn_threads_changed_listener(&bus, tx.clone());

    // Startup fetches: account role and the initial thread list.
    spawn_role_fetch(app.backend.clone(), tx.clone());
    spawn_list_refresh(app.backend.clone(), tx.clone());

    // Abort handle for the live reveal ticker (superseded on every new reply)
    let mut reveal_abort: Option<AbortHandle> = None;

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = app.generating || app.reveal.is_some();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            let spinner_frame = (elapsed * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating, long when idle
        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if matches!(event, TuiEvent::Resize) {
                continue; // redraw already flagged
            }

            // Ctrl+C always quits regardless of mode
            if matches!(event, TuiEvent::ForceQuit) {
                should_quit |= dispatch(&mut app, Action::Quit, &mut tui, &tx, &bus, &mut reveal_abort);
                continue;
            }

            // When the search overlay is open, it owns the keyboard.
            if tui.search.is_some() {
                let search_event = tui
                    .search
                    .as_mut()
                    .and_then(|search| search.handle_event(&event, &app.threads));
                match search_event {
                    Some(SearchEvent::Select(thread_id)) => {
                        tui.search = None;
                        tui.focus = Focus::Input;
                        should_quit |= dispatch(
                            &mut app,
                            Action::SwitchThread(thread_id),
                            &mut tui,
                            &tx,
                            &bus,
                            &mut reveal_abort,
                        );
                    }
                    Some(SearchEvent::Dismiss) => tui.search = None,
                    None => {}
                }
                continue;
            }

            // Global bindings
            match event {
                TuiEvent::OpenSearch => {
                    tui.search = Some(SearchState::new());
                    continue;
                }
                TuiEvent::NewChat => {
                    should_quit |=
                        dispatch(&mut app, Action::NewChat, &mut tui, &tx, &bus, &mut reveal_abort);
                    continue;
                }
                TuiEvent::CycleVersion => {
                    should_quit |= dispatch(
                        &mut app,
                        Action::CycleVersion,
                        &mut tui,
                        &tx,
                        &bus,
                        &mut reveal_abort,
                    );
                    continue;
                }
                TuiEvent::ToggleFocus => {
                    tui.focus = match tui.focus {
                        Focus::Input => Focus::Sidebar,
                        Focus::Sidebar => Focus::Input,
                    };
                    continue;
                }
                // Esc while generating stops generation, whatever has focus.
                TuiEvent::Escape if app.generating => {
                    should_quit |= dispatch(
                        &mut app,
                        Action::CancelExchange,
                        &mut tui,
                        &tx,
                        &bus,
                        &mut reveal_abort,
                    );
                    continue;
                }
                _ => {}
            }

            // Transcript scrolling works regardless of focus.
            if tui.transcript.handle_event(&event) {
                continue;
            }

            match tui.focus {
                Focus::Input => {
                    if matches!(event, TuiEvent::Escape) {
                        continue;
                    }
                    if let Some(InputEvent::Submit(text)) = tui.input.handle_event(&event) {
                        // While generating the control is a stop button;
                        // Enter is inert and the reducer guards the race.
                        if !app.generating {
                            should_quit |= dispatch(
                                &mut app,
                                Action::SubmitPrompt(text),
                                &mut tui,
                                &tx,
                                &bus,
                                &mut reveal_abort,
                            );
                        }
                    }
                }
                Focus::Sidebar => {
                    if matches!(event, TuiEvent::Escape) {
                        tui.focus = Focus::Input;
                        continue;
                    }
                    let sidebar_event = tui.sidebar.handle_event(&event, &app.threads);
                    let action = match sidebar_event {
                        Some(SidebarEvent::Switch(id)) => {
                            tui.focus = Focus::Input;
                            Some(Action::SwitchThread(id))
                        }
                        Some(SidebarEvent::Delete(id)) => Some(Action::DeleteThread(id)),
                        Some(SidebarEvent::NewChat) => {
                            tui.focus = Focus::Input;
                            Some(Action::NewChat)
                        }
                        None => None,
                    };
                    if let Some(action) = action {
                        should_quit |=
                            dispatch(&mut app, action, &mut tui, &tx, &bus, &mut reveal_abort);
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, action, &mut tui, &tx, &bus, &mut reveal_abort) {
                should_quit = true;
            }
        }
        if should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

/// Run one action through the reducer and carry out the resulting effect.
/// Returns true when the session should quit.
fn dispatch(
    app: &mut App,
    action: Action,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
    bus: &ThreadsChangedBus,
    reveal_abort: &mut Option<AbortHandle>,
) -> bool {
    let effect = update(app, action);
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SpawnExchange {
            id,
            thread_id,
            prompt,
            cancel,
        } => {
            spawn_exchange(app.backend.clone(), tx.clone(), id, thread_id, prompt, cancel);
            false
        }
        Effect::ExchangeSucceeded { generation, steps } => {
            tui.input.clear();
            // Follow the reply as it reveals.
            tui.transcript.stick_to_bottom = true;
            supersede_reveal(reveal_abort, spawn_reveal_ticker(tx.clone(), generation, steps));
            bus.notify();
            false
        }
        Effect::NotifyThreadsChanged => {
            bus.notify();
            false
        }
        Effect::ThreadSwitched { thread_id } => {
            stop_reveal(reveal_abort);
            tui.transcript.reset();
            spawn_thread_fetch(app.backend.clone(), tx.clone(), thread_id);
            spawn_list_refresh(app.backend.clone(), tx.clone());
            false
        }
        Effect::NewChatStarted => {
            stop_reveal(reveal_abort);
            tui.input.clear();
            tui.transcript.reset();
            spawn_list_refresh(app.backend.clone(), tx.clone());
            false
        }
        Effect::RefreshThreads => {
            spawn_list_refresh(app.backend.clone(), tx.clone());
            false
        }
        Effect::DeleteThread { thread_id } => {
            spawn_delete(app.backend.clone(), tx.clone(), thread_id);
            false
        }
    }
}

fn supersede_reveal(slot: &mut Option<AbortHandle>, next: AbortHandle) {
    if let Some(old) = slot.replace(next) {
        old.abort();
    }
}

fn stop_reveal(slot: &mut Option<AbortHandle>) {
    if let Some(old) = slot.take() {
        old.abort();
    }
}

/// Forward bus notifications into the action channel. The exchange path
/// never touches the sidebar directly; this subscription is the only link.
fn spawn_threads_changed_listener(bus: &ThreadsChangedBus, tx: mpsc::Sender<Action>) {
    let mut receiver = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(()) => {
                    if tx.send(Action::RefreshThreads).is_err() {
                        return; // event loop is gone
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed signals collapse into one refresh.
                    debug!("Threads-changed listener lagged by {skipped}");
                    if tx.send(Action::RefreshThreads).is_err() {
                        return;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
            }
        }
    });
}

fn spawn_exchange(
    backend: Arc<dyn ThreadBackend>,
    tx: mpsc::Sender<Action>,
    id: u64,
    thread_id: String,
    prompt: String,
    cancel: CancellationToken,
) {
    info!("Spawning exchange {id} for thread {thread_id}");
    tokio::spawn(async move {
        let result = backend.post_exchange(&thread_id, &prompt, cancel).await;
        if tx
            .send(Action::ExchangeResolved {
                id,
                outcome: result.into(),
            })
            .is_err()
        {
            warn!("Failed to send exchange resolution: receiver dropped");
        }
    });
}

/// Emit one tick per reveal frame at the fixed interval, then stop. The
/// reducer drops ticks whose generation has been superseded.
fn spawn_reveal_ticker(tx: mpsc::Sender<Action>, generation: u64, steps: usize) -> AbortHandle {
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(REVEAL_INTERVAL);
        interval.tick().await; // first tick completes immediately
        for _ in 0..steps {
            interval.tick().await;
            if tx.send(Action::RevealTick { generation }).is_err() {
                return;
            }
        }
    });
    handle.abort_handle()
}

fn spawn_thread_fetch(backend: Arc<dyn ThreadBackend>, tx: mpsc::Sender<Action>, thread_id: String) {
    tokio::spawn(async move {
        let action = match backend.fetch_thread(&thread_id).await {
            Ok(turns) => Action::ThreadLoaded { thread_id, turns },
            Err(e) => Action::ThreadLoadFailed {
                thread_id,
                error: e.to_string(),
            },
        };
        if tx.send(action).is_err() {
            warn!("Failed to send thread fetch result: receiver dropped");
        }
    });
}

fn spawn_list_refresh(backend: Arc<dyn ThreadBackend>, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        let action = match backend.list_threads().await {
            Ok(snapshot) => Action::ThreadsLoaded(snapshot),
            Err(e) => Action::ThreadsLoadFailed(e.to_string()),
        };
        if tx.send(action).is_err() {
            warn!("Failed to send thread list: receiver dropped");
        }
    });
}

fn spawn_delete(backend: Arc<dyn ThreadBackend>, tx: mpsc::Sender<Action>, thread_id: String) {
    tokio::spawn(async move {
        let action = match backend.delete_thread(&thread_id).await {
            Ok(()) => Action::ThreadDeleted(thread_id),
            Err(e) => Action::ThreadDeleteFailed {
                thread_id,
                error: e.to_string(),
            },
        };
        if tx.send(action).is_err() {
            warn!("Failed to send delete result: receiver dropped");
        }
    });
}

fn spawn_role_fetch(backend: Arc<dyn ThreadBackend>, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        match backend.current_role().await {
            Ok(role) => {
                let _ = tx.send(Action::RoleLoaded(role));
            }
            // Fall back to the default role; the affordance just stays hidden.
            Err(e) => warn!("Failed to fetch account role: {e}"),
        }
    });
}
