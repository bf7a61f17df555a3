//! # InputBox Component
//!
//! Single-line prompt editor. The border title doubles as the
//! submit ⇄ stop affordance: one control, two mutually exclusive actions
//! depending on whether an exchange is in flight. While generating, Enter
//! does nothing and Esc stops, so the two actions can never race each other.
//!
//! The buffer is internal state; `generating` is a prop synced from the
//! session each frame.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the InputBox.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed).
    Submit(String),
}

pub struct InputBox {
    /// Text buffer (internal state).
    pub buffer: String,
    /// Cursor byte offset into `buffer`.
    cursor: usize,
    /// Whether an exchange is in flight (prop).
    pub generating: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            generating: false,
        }
    }

    /// Clear the buffer (after a successful exchange or a new chat).
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.cursor)
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<InputEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.insert(*c);
                None
            }
            TuiEvent::Paste(data) => {
                // Single-line input: pasted newlines become spaces.
                for c in data.chars() {
                    self.insert(if c == '\n' || c == '\r' { ' ' } else { c });
                }
                None
            }
            TuiEvent::Backspace => {
                if self.cursor > 0 {
                    let at = self.prev_boundary();
                    self.buffer.remove(at);
                    self.cursor = at;
                }
                None
            }
            TuiEvent::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
                None
            }
            TuiEvent::CursorLeft => {
                self.cursor = self.prev_boundary();
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = self.next_boundary();
                None
            }
            TuiEvent::Home => {
                self.cursor = 0;
                None
            }
            TuiEvent::End => {
                self.cursor = self.buffer.len();
                None
            }
            TuiEvent::Submit => Some(InputEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (title, title_style) = if self.generating {
            (
                " Generating... Esc to stop ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        } else {
            (" Ask anything. Enter to send ", Style::default().fg(Color::DarkGray))
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .title_style(title_style);

        // Keep the cursor visible when the buffer outgrows the box.
        let inner_width = area.width.saturating_sub(2) as usize;
        let before_cursor = self.buffer[..self.cursor].width();
        let scroll = before_cursor.saturating_sub(inner_width.saturating_sub(1));

        let input = Paragraph::new(self.buffer.as_str())
            .scroll((0, scroll as u16))
            .block(block);
        frame.render_widget(input, area);

        if !self.generating {
            let x = area.x + 1 + (before_cursor - scroll) as u16;
            frame.set_cursor_position(Position::new(x, area.y + 1));
        }
    }
}
