use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn in a thread's transcript.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// One message in a thread. The wire format is the same `{role, content}`
/// pair the backend stores, so this derives serde directly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Turn {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Turn {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Signed-in account role. Only gates UI affordances (the admin panel
/// hint); authorization itself is enforced server-side.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum AccountRole {
    #[serde(rename = "user")]
    #[default]
    User,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "guest")]
    Guest,
}

/// Sidebar entry for one persisted thread. Titles are server-assigned
/// (derived from the first exchange), so a brand-new local thread has no
/// summary until its first exchange lands.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub title: String,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}
