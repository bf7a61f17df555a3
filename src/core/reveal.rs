//! # Reply Reveal
//!
//! The "typing" effect. A reply arrives complete; this animates its
//! disclosure one whitespace-delimited token at a time so the user watches
//! it appear instead of getting a wall of text.
//!
//! The state here is pure; it knows nothing about timers. The TUI spawns
//! a ticker task that fires [`REVEAL_INTERVAL`] apart and sends a tick
//! action per frame; the reducer calls [`RevealState::advance`]. Each
//! reveal carries a generation number, and ticks whose generation doesn't
//! match the live reveal are dropped, so a reply arriving mid-animation
//! fully supersedes the old one and two animations can never interleave.
//!
//! The first visible frame is always the empty string: switching the
//! transcript to "animating" before any token is revealed is what prevents
//! the final content flashing on screen for a frame before the animation
//! starts.

use std::time::Duration;

/// Fixed interval between frames.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(40);

/// Progressive disclosure of one already-received reply.
///
/// Token boundaries are byte offsets into the original string, so every
/// frame is a true prefix of the reply and the terminal frame is the reply
/// verbatim, not a re-join that would collapse the author's spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealState {
    full_text: String,
    /// Byte offset just past each whitespace-delimited token.
    boundaries: Vec<usize>,
    revealed: usize,
    pub generation: u64,
}

impl RevealState {
    pub fn new(full_text: impl Into<String>, generation: u64) -> Self {
        let full_text = full_text.into();
        let mut boundaries = Vec::new();
        let mut in_token = false;
        for (offset, ch) in full_text.char_indices() {
            if ch.is_whitespace() {
                in_token = false;
            } else {
                if !in_token {
                    boundaries.push(offset);
                }
                in_token = true;
                *boundaries.last_mut().expect("pushed on token start") =
                    offset + ch.len_utf8();
            }
        }
        Self {
            full_text,
            boundaries,
            revealed: 0,
            generation,
        }
    }

    /// Number of tokens (= number of non-empty frames this reveal emits).
    pub fn token_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Reveal one more token. Returns true once the terminal frame is reached.
    pub fn advance(&mut self) -> bool {
        if self.revealed < self.boundaries.len() {
            self.revealed += 1;
        }
        self.is_done()
    }

    /// True when the full reply is visible and the caller should drop this
    /// state and render the static transcript value instead.
    pub fn is_done(&self) -> bool {
        self.revealed >= self.boundaries.len()
    }

    /// The currently visible prefix. Empty before the first advance; the
    /// whole reply (verbatim, trailing whitespace included) once done.
    pub fn frame(&self) -> &str {
        if self.revealed == 0 {
            ""
        } else if self.is_done() {
            &self.full_text
        } else {
            &self.full_text[..self.boundaries[self.revealed - 1]]
        }
    }
}
