//! Thread identity and sidebar snapshot helpers.
//!
//! Thread ids are minted client-side the moment the user starts a new chat
//! and confirmed server-side on the first exchange. The sidebar snapshot is
//! always a wholesale projection of server truth; a freshly minted local
//! id is intentionally absent from it until the first exchange lands.

pub use crate::backend::ThreadSummary;

/// Generate a new thread id. UUID v7: time-ordered so ids sort by creation
/// and collisions are not a practical concern within a session.
pub fn new_thread_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Sidebar display title, truncated with an ellipsis past `max_chars`.
/// Display-only; the stored title is never modified.
pub fn display_title(title: &str, max_chars: usize) -> String {
    let count = title.chars().count();
    if count <= max_chars {
        return title.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }
    let cut: String = title.chars().take(max_chars - 3).collect();
    format!("{cut}...")
}
