//! # Session State
//!
//! All business state for one client session, in one place. This module
//! contains domain state only; presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ThreadBackend>     // external thread store
//! ├── active_thread: String               // current thread id
//! ├── transcript: Vec<Turn>               // turns of the active thread
//! ├── draft: String                       // last submitted, uncommitted prompt
//! ├── new_chat: bool                      // thread has no server presence yet
//! ├── generating: bool                    // an exchange is in flight
//! ├── pending_exchange: Option<..>        // the one in-flight exchange
//! ├── reveal: Option<RevealState>         // animating assistant turn
//! ├── threads: Vec<ThreadSummary>         // sidebar snapshot (server truth)
//! ├── role: AccountRole                   // gates the admin affordance
//! ├── version: AssistantVersion           // cosmetic model selector
//! └── status_message: String              // status bar text
//! ```
//!
//! State changes only happen through `update(app, action)` in action.rs.
//! That keeps mutations predictable and every transition testable.

use std::sync::Arc;

use crate::backend::{AccountRole, ThreadBackend, ThreadSummary, Turn};
use crate::core::exchange::PendingExchange;
use crate::core::reveal::RevealState;
use crate::core::threads;

/// Assistant versions selectable in the title bar. Session-only state; not
/// transmitted with exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistantVersion {
    #[default]
    Mavix35,
    Mavix4,
    Mavix4Turbo,
}

impl AssistantVersion {
    /// Cycles to the next version (wraps around).
    pub fn next(self) -> AssistantVersion {
        match self {
            AssistantVersion::Mavix35 => AssistantVersion::Mavix4,
            AssistantVersion::Mavix4 => AssistantVersion::Mavix4Turbo,
            AssistantVersion::Mavix4Turbo => AssistantVersion::Mavix35,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssistantVersion::Mavix35 => "Mavix 3.5",
            AssistantVersion::Mavix4 => "Mavix 4",
            AssistantVersion::Mavix4Turbo => "Mavix 4 Turbo",
        }
    }
}

pub struct App {
    pub backend: Arc<dyn ThreadBackend>,
    /// Id of the thread the transcript belongs to. Always set: a session
    /// starts on a freshly minted new-chat thread.
    pub active_thread: String,
    pub transcript: Vec<Turn>,
    /// The prompt of the in-flight or just-cancelled exchange. Cleared on
    /// success, preserved on cancel so the user can edit and resubmit.
    pub draft: String,
    /// True until the active thread has server-side presence (first
    /// successful exchange). Drives the welcome banner.
    pub new_chat: bool,
    pub generating: bool,
    pub pending_exchange: Option<PendingExchange>,
    /// Animation over the last assistant turn. `None` means the transcript
    /// is authoritative for that turn; `Some` means the reveal frame is.
    pub reveal: Option<RevealState>,
    pub threads: Vec<ThreadSummary>,
    pub role: AccountRole,
    pub version: AssistantVersion,
    pub status_message: String,
    /// Monotonic counters distinguishing live exchanges/reveals from
    /// superseded ones.
    pub(crate) exchange_seq: u64,
    pub(crate) reveal_seq: u64,
}

impl App {
    pub fn new(backend: Arc<dyn ThreadBackend>) -> Self {
        Self {
            backend,
            active_thread: threads::new_thread_id(),
            transcript: Vec::new(),
            draft: String::new(),
            new_chat: true,
            generating: false,
            pending_exchange: None,
            reveal: None,
            threads: Vec::new(),
            role: AccountRole::default(),
            version: AssistantVersion::default(),
            status_message: String::from("Welcome to Mavix!"),
            exchange_seq: 0,
            reveal_seq: 0,
        }
    }

    /// The transcript value to display for the last assistant turn:
    /// the reveal frame while animating, the stored turn otherwise.
    pub fn visible_last_assistant_content(&self) -> Option<&str> {
        match (&self.reveal, self.transcript.last()) {
            (Some(reveal), _) => Some(reveal.frame()),
            (None, Some(turn)) => Some(turn.content.as_str()),
            (None, None) => None,
        }
    }
}
