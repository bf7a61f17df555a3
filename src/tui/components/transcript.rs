//! # Transcript Component
//!
//! The conversation view. User turns render as plain wrapped text with a
//! prompt marker; assistant turns go through the markdown renderer. While
//! a reveal is running, the last assistant turn is drawn from the reveal
//! frame instead of the stored turn; one of the two is authoritative at
//! any moment, never both. A three-dot loader shows while generating, and
//! an empty new chat gets the welcome banner.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;

use crate::backend::{Role, Turn};
use crate::tui::event::TuiEvent;
use crate::tui::markdown;

const LOADER_FRAMES: [&str; 4] = ["·  ", "·· ", "···", "   "];

/// Persistent scroll state.
pub struct TranscriptState {
    pub scroll: u16,
    /// Follow new content as it arrives. Any manual scroll turns this off;
    /// End turns it back on.
    pub stick_to_bottom: bool,
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptState {
    pub fn new() -> Self {
        Self {
            scroll: 0,
            stick_to_bottom: true,
        }
    }

    pub fn reset(&mut self) {
        self.scroll = 0;
        self.stick_to_bottom = true;
    }

    /// Scroll keys work regardless of focus. Returns true if handled.
    pub fn handle_event(&mut self, event: &TuiEvent) -> bool {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
                self.stick_to_bottom = false;
                true
            }
            TuiEvent::ScrollDown => {
                self.scroll = self.scroll.saturating_add(1);
                true
            }
            TuiEvent::ScrollPageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                self.stick_to_bottom = false;
                true
            }
            TuiEvent::ScrollPageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            _ => false,
        }
    }
}

/// Transient render wrapper.
pub struct Transcript<'a> {
    pub turns: &'a [Turn],
    /// Current reveal frame for the last assistant turn, if animating.
    pub reveal_frame: Option<&'a str>,
    pub generating: bool,
    pub new_chat: bool,
    pub spinner_frame: usize,
    pub state: &'a mut TranscriptState,
}

impl<'a> Transcript<'a> {
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.new_chat && self.turns.is_empty() && !self.generating {
            let banner = Paragraph::new(Line::from(Span::styled(
                "Start a New Chat",
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center);
            let mid = Rect {
                y: area.y + area.height / 2,
                height: 1,
                ..area
            };
            frame.render_widget(banner, mid);
            return;
        }

        let text = self.build_text(area.width);
        let paragraph = Paragraph::new(text).wrap(ratatui::widgets::Wrap { trim: false });

        let total = paragraph.line_count(area.width) as u16;
        let max_scroll = total.saturating_sub(area.height);
        if self.state.stick_to_bottom || self.state.scroll > max_scroll {
            self.state.scroll = max_scroll;
        }
        if self.state.scroll >= max_scroll {
            self.state.stick_to_bottom = true;
        }

        frame.render_widget(paragraph.scroll((self.state.scroll, 0)), area);
    }

    fn build_text(&self, width: u16) -> Text<'static> {
        let mut text = Text::default();

        // While animating, the last assistant turn is drawn from the
        // reveal frame; the stored turn stays out of the static section.
        let animating_last = self.reveal_frame.is_some()
            && matches!(self.turns.last(), Some(t) if t.role == Role::Assistant);
        let static_turns = if animating_last {
            &self.turns[..self.turns.len() - 1]
        } else {
            self.turns
        };

        for turn in static_turns {
            push_turn(&mut text, turn, width);
        }
        if let Some(frame) = self.reveal_frame {
            push_assistant_text(&mut text, frame);
        }

        if self.generating {
            text.lines.push(Line::default());
            let dots = LOADER_FRAMES[self.spinner_frame % LOADER_FRAMES.len()];
            text.lines.push(Line::from(Span::styled(
                format!("Assistant is thinking {dots}"),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        text
    }
}

fn push_turn(text: &mut Text<'static>, turn: &Turn, width: u16) {
    match turn.role {
        Role::User => {
            if !text.lines.is_empty() {
                text.lines.push(Line::default());
            }
            let wrap_width = (width.saturating_sub(4) as usize).max(20);
            for (i, line) in textwrap::wrap(&turn.content, wrap_width).iter().enumerate() {
                let marker = if i == 0 { "❯ " } else { "  " };
                text.lines.push(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Cyan)),
                    Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                ]));
            }
        }
        Role::Assistant => push_assistant_text(text, &turn.content),
    }
}

fn push_assistant_text(text: &mut Text<'static>, content: &str) {
    if !text.lines.is_empty() {
        text.lines.push(Line::default());
    }
    // The markdown renderer tolerates partial frames mid-reveal.
    text.lines.extend(markdown::render(content, Color::White).lines);
}
