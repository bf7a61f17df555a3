//! # Sidebar Component
//!
//! Always-visible thread list: every persisted conversation of the
//! signed-in user, most recent first (server order). The active thread is
//! highlighted even when the sidebar isn't focused. Deleting asks for a
//! second `d` as confirmation.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding};

use crate::backend::ThreadSummary;
use crate::core::threads::display_title;
use crate::tui::event::TuiEvent;

/// Persistent state for the sidebar.
pub struct SidebarState {
    pub selected: usize,
    pub confirm_delete: bool,
    pub list_state: ListState,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self::new()
    }
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            confirm_delete: false,
            list_state: ListState::default(),
        }
    }

    /// Handle a key event while the sidebar is focused. `threads` is the
    /// current snapshot; selection is clamped against it.
    pub fn handle_event(
        &mut self,
        event: &TuiEvent,
        threads: &[ThreadSummary],
    ) -> Option<SidebarEvent> {
        self.clamp(threads.len());

        // Any key other than `d` resets the pending confirmation.
        let is_delete_key = matches!(event, TuiEvent::InputChar('d'));
        if !is_delete_key {
            self.confirm_delete = false;
        }

        match event {
            TuiEvent::CursorUp => {
                if !threads.is_empty() {
                    self.selected = self.selected.saturating_sub(1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::CursorDown => {
                if !threads.is_empty() {
                    self.selected = (self.selected + 1).min(threads.len() - 1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::Submit => threads
                .get(self.selected)
                .map(|t| SidebarEvent::Switch(t.thread_id.clone())),
            TuiEvent::InputChar('n') => Some(SidebarEvent::NewChat),
            TuiEvent::InputChar('d') => {
                let thread = threads.get(self.selected)?;
                if self.confirm_delete {
                    self.confirm_delete = false;
                    Some(SidebarEvent::Delete(thread.thread_id.clone()))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }

    fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }
}

/// Events emitted by the sidebar.
pub enum SidebarEvent {
    Switch(String),
    Delete(String),
    NewChat,
}

/// Transient render wrapper.
pub struct Sidebar<'a> {
    pub threads: &'a [ThreadSummary],
    pub active_thread: &'a str,
    pub focused: bool,
    pub state: &'a mut SidebarState,
}

impl<'a> Sidebar<'a> {
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.clamp(self.threads.len());

        let border_style = if self.focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let help_text = if self.state.confirm_delete {
            " d confirm delete "
        } else {
            " n New  d Delete  Enter Open "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Chats ")
            .title_bottom(Line::from(help_text).centered())
            .padding(Padding::horizontal(1));

        if self.threads.is_empty() {
            let empty = ratatui::widgets::Paragraph::new("No conversations yet.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        // Layout per row: "<title padded>  Jan 15"
        let inner_width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .threads
            .iter()
            .enumerate()
            .map(|(i, thread)| {
                let date = thread
                    .updated_at
                    .map(format_recency)
                    .unwrap_or_default();
                let title_width = inner_width.saturating_sub(date.len() + 2);
                let title = display_title(&thread.title, title_width);
                let padded = format!("{:<width$}", title, width = title_width);

                let is_active = thread.thread_id == self.active_thread;
                let is_selected = self.focused && i == self.state.selected;
                let style = match (is_selected, self.state.confirm_delete, is_active) {
                    (true, true, _) => Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                    (true, false, _) => Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                    (false, _, true) => {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    }
                    _ => Style::default().fg(Color::Gray),
                };

                ListItem::new(Line::from(vec![
                    Span::styled(padded, style),
                    Span::styled("  ", style),
                    Span::styled(date, style.add_modifier(Modifier::DIM)),
                ]))
            })
            .collect();

        frame.render_stateful_widget(List::new(items).block(block), area, &mut self.state.list_state);
    }
}

/// Format a server timestamp as a "Jan 15" style recency date.
fn format_recency(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.with_timezone(&chrono::Local).format("%b %d").to_string()
}
