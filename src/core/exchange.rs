//! One prompt → reply request cycle.
//!
//! The session holds at most one [`PendingExchange`] at a time; while it
//! exists the submit control becomes a stop control, so a second submit is
//! impossible by construction. Each exchange gets a monotonically
//! increasing id, and outcome resolution is keyed on that id: a
//! resolution for an exchange that has been cancelled or superseded no
//! longer matches anything and falls on the floor. That is what makes the
//! terminal outcome exactly-once.

use tokio_util::sync::CancellationToken;

use crate::backend::BackendError;

/// The in-flight exchange, alive from submit until its single terminal
/// outcome. Never persisted.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub id: u64,
    /// Thread the prompt was submitted against. Turn-append targets this,
    /// not whatever thread is active when the reply lands.
    pub thread_id: String,
    pub prompt: String,
    pub cancel: CancellationToken,
}

impl PendingExchange {
    pub fn new(id: u64, thread_id: String, prompt: String) -> Self {
        Self {
            id,
            thread_id,
            prompt,
            cancel: CancellationToken::new(),
        }
    }
}

/// Terminal outcome of an exchange.
#[derive(Debug)]
pub enum ExchangeOutcome {
    Succeeded(String),
    Cancelled,
    Failed(BackendError),
}

impl From<Result<String, BackendError>> for ExchangeOutcome {
    fn from(result: Result<String, BackendError>) -> Self {
        match result {
            Ok(reply) => ExchangeOutcome::Succeeded(reply),
            Err(BackendError::Cancelled) => ExchangeOutcome::Cancelled,
            Err(e) => ExchangeOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_backend_result() {
        assert!(matches!(
            ExchangeOutcome::from(Ok("hi".to_string())),
            ExchangeOutcome::Succeeded(reply) if reply == "hi"
        ));
        assert!(matches!(
            ExchangeOutcome::from(Err(BackendError::Cancelled)),
            ExchangeOutcome::Cancelled
        ));
        assert!(matches!(
            ExchangeOutcome::from(Err(BackendError::Network("down".into()))),
            ExchangeOutcome::Failed(BackendError::Network(_))
        ));
    }

    #[test]
    fn test_cancel_token_is_idempotent() {
        let exchange = PendingExchange::new(1, "t1".to_string(), "hi".to_string());
        exchange.cancel.cancel();
        exchange.cancel.cancel();
        assert!(exchange.cancel.is_cancelled());
    }
}
