//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::backend::{AccountRole, BackendError, ThreadBackend, ThreadSummary, Turn};

/// A canned-response backend for tests that don't need real HTTP.
pub struct StaticBackend {
    pub threads: Vec<ThreadSummary>,
    pub reply: String,
}

impl Default for StaticBackend {
    fn default() -> Self {
        Self {
            threads: Vec::new(),
            reply: String::from("canned reply"),
        }
    }
}

#[async_trait]
impl ThreadBackend for StaticBackend {
    fn name(&self) -> &str {
        "static"
    }

    async fn current_role(&self) -> Result<AccountRole, BackendError> {
        Ok(AccountRole::User)
    }

    async fn list_threads(&self) -> Result<Vec<ThreadSummary>, BackendError> {
        Ok(self.threads.clone())
    }

    async fn fetch_thread(&self, _thread_id: &str) -> Result<Vec<Turn>, BackendError> {
        Ok(Vec::new())
    }

    async fn delete_thread(&self, _thread_id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn post_exchange(
        &self,
        _thread_id: &str,
        _prompt: &str,
        cancel: CancellationToken,
    ) -> Result<String, BackendError> {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        Ok(self.reply.clone())
    }
}

/// Creates a test App with a StaticBackend.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(StaticBackend::default()))
}
