//! # Backend Boundary
//!
//! Everything the client needs from the outside world goes through the
//! [`ThreadBackend`] trait: the thread store, the generation endpoint, and
//! the role check. The TUI never talks HTTP directly; it clones an
//! `Arc<dyn ThreadBackend>` into background tasks and feeds the results
//! back through the action channel.

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

mod http;
mod types;

pub use http::HttpBackend;
pub use types::{AccountRole, Role, ThreadSummary, Turn};

/// Errors that can occur talking to the backend.
/// Variants carry enough info to distinguish retryable failures (future use).
#[derive(Debug)]
pub enum BackendError {
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// API returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Failed to parse the backend's response. Not retryable.
    Parse(String),
    /// The caller cancelled the request. Not an error from the user's
    /// point of view; never surfaced as one.
    Cancelled,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
            BackendError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for BackendError {}

#[async_trait]
pub trait ThreadBackend: Send + Sync {
    /// Returns the name of the backend (for logs).
    fn name(&self) -> &str;

    /// Role of the signed-in account. Used only to gate the admin affordance.
    async fn current_role(&self) -> Result<AccountRole, BackendError>;

    /// Full thread list for the signed-in account, in server order.
    async fn list_threads(&self) -> Result<Vec<ThreadSummary>, BackendError>;

    /// Complete transcript of one thread.
    async fn fetch_thread(&self, thread_id: &str) -> Result<Vec<Turn>, BackendError>;

    /// Delete a thread. The caller removes it locally only after this acks.
    async fn delete_thread(&self, thread_id: &str) -> Result<(), BackendError>;

    /// Run one prompt → reply exchange against a thread. The single
    /// generation suspension point. Implementations must honor `cancel` by
    /// aborting the transport, not just discarding the result, and return
    /// [`BackendError::Cancelled`] when they do.
    async fn post_exchange(
        &self,
        thread_id: &str,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<String, BackendError>;
}
