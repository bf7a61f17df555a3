//! # TUI Components
//!
//! Stateless components receive all data as props each frame (`TitleBar`).
//! Stateful components own presentation state and emit high-level events
//! (`Sidebar`, `InputBox`, `SearchPopup`, `Transcript`). Persistent state
//! lives in `TuiState`; a transient wrapper borrowing that state is built
//! per frame for rendering.

pub mod input_box;
pub mod search_popup;
pub mod sidebar;
pub mod title_bar;
pub mod transcript;

pub use input_box::{InputBox, InputEvent};
pub use search_popup::{SearchEvent, SearchPopup, SearchState};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use title_bar::TitleBar;
pub use transcript::{Transcript, TranscriptState};
