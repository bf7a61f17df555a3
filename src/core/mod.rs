//! # Core Session Engine
//!
//! The chat session and thread synchronization engine. It knows nothing
//! about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │           CORE              │
//!                    │  (this module)              │
//!                    │                             │
//!                    │  • state   (session data)   │
//!                    │  • action  (events+reducer) │
//!                    │  • exchange (request cycle) │
//!                    │  • reveal  (typing effect)  │
//!                    │  • threads / search         │
//!                    │  • broadcast (list refresh) │
//!                    └──────────────┬──────────────┘
//!                                   │
//!                     ┌─────────────┴─────────────┐
//!                     ▼                           ▼
//!              ┌────────────┐             ┌──────────────┐
//!              │    TUI     │             │   backend    │
//!              │  Adapter   │             │ collaborator │
//!              │ (ratatui)  │             │  (reqwest)   │
//!              └────────────┘             └──────────────┘
//! ```

pub mod action;
pub mod broadcast;
pub mod config;
pub mod exchange;
pub mod reveal;
pub mod search;
pub mod state;
pub mod threads;
