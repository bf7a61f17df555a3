//! HTTP implementation of [`ThreadBackend`] against the Mavix REST API.
//!
//! Routes:
//! - `GET    /api/auth/me/role`   → `{ "role": "user" | "admin" | "guest" }`
//! - `GET    /api/thread`         → `[ { threadId, title, updatedAt? } ]`
//! - `GET    /api/thread/{id}`    → `[ { role, content } ]`
//! - `DELETE /api/thread/{id}`    → ack
//! - `POST   /api/chat`           → `{ "reply": { "response": "..." } }`
//!
//! `post_exchange` races the request against a `CancellationToken`:
//! dropping the in-flight reqwest future closes the connection, so the
//! server stops generating instead of finishing into the void.

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::types::{AccountRole, ThreadSummary, Turn};
use super::{BackendError, ThreadBackend};

#[derive(Deserialize, Debug)]
struct RoleResponse {
    role: AccountRole,
}

/// Request body for `POST /api/chat`. The prompt field is named `messages`
/// on the wire (backend contract, singular content despite the name).
#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    #[serde(rename = "threadId")]
    thread_id: &'a str,
    messages: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    reply: ReplyBody,
}

#[derive(Deserialize, Debug)]
struct ReplyBody {
    response: String,
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl HttpBackend {
    /// Build a backend for `base_url` (no trailing slash required).
    ///
    /// `session_cookie` is attached verbatim as a `Cookie` header when set;
    /// the session itself is owned by the auth collaborator.
    pub fn new(
        base_url: String,
        session_cookie: Option<String>,
        request_timeout_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(request_timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_cookie,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => builder.header("Cookie", cookie.clone()),
            None => builder,
        }
    }

    /// Send a request, map transport errors, and reject non-2xx statuses
    /// with the response body as the message.
    async fn send_checked(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, BackendError> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            warn!("Backend returned HTTP {}: {}", status.as_u16(), message);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, BackendError> {
        let response = self.send_checked(self.client.get(self.url(path))).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ThreadBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn current_role(&self) -> Result<AccountRole, BackendError> {
        let body: RoleResponse = self.get_json("/api/auth/me/role").await?;
        debug!("Fetched account role: {:?}", body.role);
        Ok(body.role)
    }

    async fn list_threads(&self) -> Result<Vec<ThreadSummary>, BackendError> {
        let threads: Vec<ThreadSummary> = self.get_json("/api/thread").await?;
        debug!("Fetched {} threads", threads.len());
        Ok(threads)
    }

    async fn fetch_thread(&self, thread_id: &str) -> Result<Vec<Turn>, BackendError> {
        self.get_json(&format!("/api/thread/{thread_id}")).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), BackendError> {
        self.send_checked(self.client.delete(self.url(&format!("/api/thread/{thread_id}"))))
            .await?;
        debug!("Deleted thread {thread_id}");
        Ok(())
    }

    async fn post_exchange(
        &self,
        thread_id: &str,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<String, BackendError> {
        let body = ChatRequest {
            thread_id,
            messages: prompt,
        };
        let builder = self.client.post(self.url("/api/chat")).json(&body);

        // Losing the select drops the in-flight future, which aborts the
        // underlying connection. That is the whole point of the token: the
        // server-side resource is released, not just the return value.
        tokio::select! {
            result = self.send_checked(builder) => {
                let response = result?;
                let parsed: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| BackendError::Parse(e.to_string()))?;
                Ok(parsed.reply.response)
            }
            _ = cancel.cancelled() => {
                debug!("Exchange for thread {thread_id} cancelled in flight");
                Err(BackendError::Cancelled)
            }
        }
    }
}
