//! Markdown → ratatui `Text` renderer.
//!
//! Thin wrapper around `pulldown_cmark` that converts markdown events into
//! styled `Line`/`Span` values. Headings, bold, italic, inline code, fenced
//! code blocks (plain, dimmed), lists, blockquotes, and links.
//!
//! During the reveal animation this gets handed syntactically incomplete
//! text: an unterminated code block, a half-written list item. The parser
//! renders whatever it is given; it never fails, it just looks unfinished
//! for a few frames.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// Parse markdown content into styled `Text`.
///
/// Returns owned text (`'static`) so callers aren't constrained by input lifetime.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut w = Writer::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        w.handle(event);
    }
    w.flush_current();
    w.text
}

struct Writer {
    text: Text<'static>,
    base_fg: Color,
    /// Inline style stack; styles compose via `patch` so nested
    /// bold+italic works.
    styles: Vec<Style>,
    current: Vec<Span<'static>>,
    /// Per-line prefix (blockquote bar, list indent).
    prefix: Vec<Span<'static>>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    in_code_block: bool,
    link_url: Option<String>,
}

impl Writer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: vec![],
            current: vec![],
            prefix: vec![],
            list_indices: vec![],
            in_code_block: false,
            link_url: None,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn flush_current(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = self.prefix.clone();
        spans.append(&mut self.current);
        self.text.lines.push(Line::from(spans));
    }

    fn blank_line(&mut self) {
        if !self.text.lines.is_empty() {
            self.text.lines.push(Line::default());
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.blank_line();
                let color = match level {
                    HeadingLevel::H1 | HeadingLevel::H2 => Color::Yellow,
                    _ => Color::LightYellow,
                };
                self.push_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
                self.current.push(Span::styled(
                    format!("{} ", "#".repeat(heading_depth(level))),
                    self.style(),
                ));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.pop_style();
                self.flush_current();
            }
            Event::Start(Tag::Paragraph) => self.blank_line(),
            Event::End(TagEnd::Paragraph) => self.flush_current(),
            Event::Start(Tag::Emphasis) => {
                self.push_style(Style::default().add_modifier(Modifier::ITALIC))
            }
            Event::End(TagEnd::Emphasis) => self.pop_style(),
            Event::Start(Tag::Strong) => {
                self.push_style(Style::default().add_modifier(Modifier::BOLD))
            }
            Event::End(TagEnd::Strong) => self.pop_style(),
            Event::Start(Tag::Strikethrough) => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Event::End(TagEnd::Strikethrough) => self.pop_style(),
            Event::Start(Tag::BlockQuote(_)) => {
                self.blank_line();
                self.prefix
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.flush_current();
                self.prefix.pop();
            }
            Event::Start(Tag::CodeBlock(_)) => {
                self.blank_line();
                self.in_code_block = true;
                self.push_style(
                    Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
                );
            }
            Event::End(TagEnd::CodeBlock) => {
                self.flush_current();
                self.pop_style();
                self.in_code_block = false;
            }
            Event::Start(Tag::List(start)) => {
                if self.list_indices.is_empty() {
                    self.blank_line();
                }
                self.list_indices.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.list_indices.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush_current();
                let depth = self.list_indices.len().saturating_sub(1);
                let marker = match self.list_indices.last_mut() {
                    Some(Some(index)) => {
                        let m = format!("{}{}. ", "  ".repeat(depth), index);
                        *index += 1;
                        m
                    }
                    _ => format!("{}• ", "  ".repeat(depth)),
                };
                self.current
                    .push(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            Event::End(TagEnd::Item) => self.flush_current(),
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.push_style(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
                self.link_url = Some(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    self.current.push(Span::styled(
                        format!(" ({url})"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            Event::Text(text) => {
                if self.in_code_block {
                    // Code arrives as one blob with embedded newlines.
                    for line in text.lines() {
                        self.current.push(Span::styled(line.to_string(), self.style()));
                        self.flush_current();
                    }
                } else {
                    self.current.push(Span::styled(text.to_string(), self.style()));
                }
            }
            Event::Code(code) => {
                self.current.push(Span::styled(
                    code.to_string(),
                    self.style().fg(Color::LightCyan),
                ));
            }
            Event::SoftBreak => {
                self.current.push(Span::styled(" ".to_string(), self.style()))
            }
            Event::HardBreak => self.flush_current(),
            Event::Rule => {
                self.flush_current();
                self.text.lines.push(Line::from(Span::styled(
                    "────────",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.current
                    .push(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            _ => {}
        }
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
