//! # Search Popup Component
//!
//! Centered overlay for finding a conversation by title. The query is
//! re-filtered on every keystroke through `core::search`; Enter switches
//! to the selected match, Esc dismisses.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SearchState` lives in `TuiState` (Some = overlay open)
//! - `SearchPopup` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::backend::ThreadSummary;
use crate::core::search::filter_threads;
use crate::tui::event::TuiEvent;

/// Persistent state for the search overlay.
pub struct SearchState {
    pub query: String,
    pub selected: usize,
    pub list_state: ListState,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            selected: 0,
            list_state: ListState::default(),
        }
    }

    /// Handle a key event. `threads` is the full snapshot; filtering
    /// happens here so selection indexes the filtered view.
    pub fn handle_event(
        &mut self,
        event: &TuiEvent,
        threads: &[ThreadSummary],
    ) -> Option<SearchEvent> {
        let filtered = filter_threads(threads, &self.query);
        match event {
            TuiEvent::Escape => Some(SearchEvent::Dismiss),
            TuiEvent::InputChar(c) => {
                self.query.push(*c);
                self.selected = 0;
                None
            }
            TuiEvent::Backspace => {
                self.query.pop();
                self.selected = 0;
                None
            }
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                if !filtered.is_empty() {
                    self.selected = (self.selected + 1).min(filtered.len() - 1);
                }
                None
            }
            TuiEvent::Submit => filtered
                .get(self.selected.min(filtered.len().saturating_sub(1)))
                .map(|t| SearchEvent::Select(t.thread_id.clone())),
            _ => None,
        }
    }
}

/// Events emitted by the search overlay.
pub enum SearchEvent {
    Select(String),
    Dismiss,
}

/// Transient render wrapper.
pub struct SearchPopup<'a> {
    pub threads: &'a [ThreadSummary],
    pub state: &'a mut SearchState,
}

impl<'a> SearchPopup<'a> {
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 60, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Search ")
            .title_bottom(Line::from(" Enter Open  Esc Close ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [query_area, results_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

        let query_line = if self.query_is_empty() {
            Paragraph::new("Search any history...").style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(self.state.query.as_str())
        };
        frame.render_widget(query_line, query_area);

        let filtered = filter_threads(self.threads, &self.state.query);
        if filtered.is_empty() {
            let empty = Paragraph::new("No matching history")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, results_area);
            return;
        }

        self.state.selected = self.state.selected.min(filtered.len() - 1);
        self.state.list_state.select(Some(self.state.selected));

        let items: Vec<ListItem> = filtered
            .iter()
            .enumerate()
            .map(|(i, thread)| {
                let style = if i == self.state.selected {
                    Style::default().fg(Color::White).add_modifier(Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(Line::styled(thread.title.clone(), style))
            })
            .collect();

        frame.render_stateful_widget(List::new(items), results_area, &mut self.state.list_state);
    }

    fn query_is_empty(&self) -> bool {
        self.state.query.is_empty()
    }
}

/// Compute a centered rect using percentage of the outer rect.
fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threads() -> Vec<ThreadSummary> {
        ["Trip Plan", "recipe", "Rust notes"]
            .iter()
            .enumerate()
            .map(|(i, title)| ThreadSummary {
                thread_id: format!("t{i}"),
                title: title.to_string(),
                updated_at: None,
            })
            .collect()
    }

    #[test]
    fn test_typing_narrows_and_enter_selects() {
        let mut state = SearchState::new();
        let list = threads();
        for c in "trip".chars() {
            state.handle_event(&TuiEvent::InputChar(c), &list);
        }
        let event = state.handle_event(&TuiEvent::Submit, &list);
        assert!(matches!(event, Some(SearchEvent::Select(id)) if id == "t0"));
    }

    #[test]
    fn test_selection_indexes_the_filtered_view() {
        let mut state = SearchState::new();
        let list = threads();
        for c in "r".chars() {
            state.handle_event(&TuiEvent::InputChar(c), &list);
        }
        // "Trip Plan", "recipe", "Rust notes" all contain an r; pick the third.
        state.handle_event(&TuiEvent::CursorDown, &list);
        state.handle_event(&TuiEvent::CursorDown, &list);
        let event = state.handle_event(&TuiEvent::Submit, &list);
        assert!(matches!(event, Some(SearchEvent::Select(id)) if id == "t2"));
    }

    #[test]
    fn test_query_edit_resets_selection() {
        let mut state = SearchState::new();
        let list = threads();
        state.handle_event(&TuiEvent::CursorDown, &list);
        state.handle_event(&TuiEvent::InputChar('r'), &list);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_enter_with_no_matches_is_a_no_op() {
        let mut state = SearchState::new();
        let list = threads();
        for c in "zzz".chars() {
            state.handle_event(&TuiEvent::InputChar(c), &list);
        }
        assert!(state.handle_event(&TuiEvent::Submit, &list).is_none());
    }

    #[test]
    fn test_escape_dismisses() {
        let mut state = SearchState::new();
        let event = state.handle_event(&TuiEvent::Escape, &threads());
        assert!(matches!(event, Some(SearchEvent::Dismiss)));
    }
}
