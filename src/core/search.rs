//! In-memory thread search: case-insensitive substring match over titles,
//! preserving snapshot order. Re-evaluated on every keystroke; the
//! snapshot is small enough that indexing or debouncing would be
//! optimization theater.

use crate::backend::ThreadSummary;

/// Filter a snapshot by `query`. An empty query returns the snapshot
/// unchanged; matching ignores ASCII/Unicode case.
pub fn filter_threads(snapshot: &[ThreadSummary], query: &str) -> Vec<ThreadSummary> {
    if query.is_empty() {
        return snapshot.to_vec();
    }
    let needle = query.to_lowercase();
    snapshot
        .iter()
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
