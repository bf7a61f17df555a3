//! # TitleBar Component
//!
//! Single-line status bar: brand + selected assistant version, the current
//! status message, and the admin-panel affordance when the signed-in role
//! warrants it. Purely presentational: all fields are props.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::backend::AccountRole;
use crate::tui::component::Component;

pub struct TitleBar {
    pub version_label: &'static str,
    pub status_message: String,
    pub role: AccountRole,
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                " Mavix ",
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("({}) ", self.version_label),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::raw(self.status_message.clone()));
        }
        if self.role == AccountRole::Admin {
            spans.push(Span::styled(
                "  [admin panel available]",
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }
}
