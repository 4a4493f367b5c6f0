//! Chat view: question input and the conversation transcript.
//!
//! All conversation state lives in [`ConversationController`]; this view only
//! owns input editing, scrolling and the thinking animation.
//!
//! [`ConversationController`]: crate::core::conversation::ConversationController

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::super::theme;

use crate::core::conversation::{ConversationController, ExchangeOutcome};
use crate::core::models::{Message, Role};
use crate::tui::events::NotificationLevel;
use crate::tui::services::Services;
use crate::tui::widgets::input_buffer::InputBuffer;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatInputMode {
    Normal,
    Insert,
}

const THINKING_FRAMES: [&str; 4] = ["thinking", "thinking.", "thinking..", "thinking..."];

/// Soft-wrap one paragraph to `width` columns, breaking on whitespace and
/// splitting words longer than a full line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in raw.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }
        lines.push(current);
    }
    lines
}

fn role_header(role: Role) -> Line<'static> {
    Line::from(Span::styled(
        format!("── {} ──", role.label()),
        Style::default()
            .fg(theme::role_color(role))
            .add_modifier(Modifier::BOLD),
    ))
}

fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let mut out = vec![role_header(message.role)];
    out.extend(
        wrap_text(&message.content, width)
            .into_iter()
            .map(Line::raw),
    );
    out.push(Line::raw(""));
    out
}

// ============================================================================
// State
// ============================================================================

pub struct ChatState {
    input: InputBuffer,
    input_mode: ChatInputMode,
    scroll_offset: usize,
    auto_scroll: bool,
    thinking_frame: usize,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            input: InputBuffer::new(),
            input_mode: ChatInputMode::Normal,
            scroll_offset: 0,
            auto_scroll: true,
            thinking_frame: 0,
        }
    }

    pub fn input_mode(&self) -> ChatInputMode {
        self.input_mode
    }

    pub fn input_text(&self) -> &str {
        self.input.text()
    }

    pub fn on_tick(&mut self) {
        self.thinking_frame = self.thinking_frame.wrapping_add(1);
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &mut Services) -> bool {
        if let Event::Paste(text) = event {
            if self.input_mode == ChatInputMode::Insert {
                self.input.insert_str(text);
                return true;
            }
            return false;
        }

        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match self.input_mode {
            ChatInputMode::Insert => self.handle_insert_input(*code, *modifiers, services),
            ChatInputMode::Normal => self.handle_normal_input(*code, *modifiers),
        }
    }

    fn handle_insert_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        services: &mut Services,
    ) -> bool {
        // These always fall through to global
        match (modifiers, code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return false,
            (_, KeyCode::Tab) | (_, KeyCode::BackTab) => return false,
            _ => {}
        }

        match (modifiers, code) {
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.input_mode = ChatInputMode::Normal;
                true
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                self.submit(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Backspace) => {
                self.input.backspace();
                true
            }
            (KeyModifiers::NONE, KeyCode::Delete) => {
                self.input.delete();
                true
            }
            (KeyModifiers::NONE, KeyCode::Left) => {
                self.input.move_left();
                true
            }
            (KeyModifiers::NONE, KeyCode::Right) => {
                self.input.move_right();
                true
            }
            (KeyModifiers::NONE, KeyCode::Home) => {
                self.input.move_home();
                true
            }
            (KeyModifiers::NONE, KeyCode::End) => {
                self.input.move_end();
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.input.clear();
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                self.input.move_home();
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.input.move_end();
                true
            }
            (_, KeyCode::Char(c)) => {
                self.input.insert_char(c);
                true
            }
            _ => true, // Consume but ignore other keys in insert mode
        }
    }

    fn handle_normal_input(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers != KeyModifiers::NONE && modifiers != KeyModifiers::SHIFT {
            return false;
        }

        match code {
            KeyCode::Char('i') | KeyCode::Enter => {
                self.input_mode = ChatInputMode::Insert;
                true
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_down(1);
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_up(1);
                true
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.scroll_to_bottom();
                true
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.scroll_to_top();
                true
            }
            KeyCode::PageDown => {
                self.scroll_down(10);
                true
            }
            KeyCode::PageUp => {
                self.scroll_up(10);
                true
            }
            _ => false, // Fall through to global handler
        }
    }

    /// Hand the typed question to the controller. The draft is kept while an
    /// earlier question is still unanswered.
    fn submit(&mut self, services: &mut Services) {
        if self.input.is_empty() {
            return;
        }
        if services.conversation.is_sending() {
            services.notify(
                "Still waiting for the previous answer",
                NotificationLevel::Warning,
            );
            return;
        }
        let text = self.input.take();
        if services.conversation.submit(&text) {
            self.scroll_to_bottom();
        }
    }

    // ── Scrolling ────────────────────────────────────────────────────

    fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(n);
        self.auto_scroll = false;
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
        self.auto_scroll = false;
    }

    fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
    }

    fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = false;
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        conversation: &ConversationController,
        focused: bool,
    ) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Messages
            Constraint::Length(4), // Mode indicator + input
        ])
        .split(area);

        self.render_messages(frame, chunks[0], conversation, focused);
        self.render_input(frame, chunks[1], conversation);
    }

    fn render_messages(
        &self,
        frame: &mut Frame,
        area: Rect,
        conversation: &ConversationController,
        focused: bool,
    ) {
        let block = if focused {
            theme::block_focused("Chat")
        } else {
            theme::block_default("Chat")
        };
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if conversation.messages().is_empty() && !conversation.is_sending() {
            let welcome = Paragraph::new(vec![
                Line::raw(""),
                Line::styled(
                    "  Welcome to Spectron",
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                ),
                Line::raw(""),
                Line::styled(
                    "  Upload documents and start asking questions!",
                    theme::muted(),
                ),
                Line::styled("  Press i or Enter to start typing.", theme::muted()),
            ]);
            frame.render_widget(welcome, inner);
            return;
        }

        // Leave a column for the scrollbar.
        let width = inner.width.saturating_sub(1) as usize;
        let mut all_lines: Vec<Line> = conversation
            .messages()
            .iter()
            .flat_map(|m| message_lines(m, width))
            .collect();

        if conversation.is_sending() {
            all_lines.push(role_header(Role::Assistant));
            all_lines.push(Line::styled(
                THINKING_FRAMES[(self.thinking_frame / 5) % THINKING_FRAMES.len()],
                Style::default()
                    .fg(theme::TEXT_MUTED)
                    .add_modifier(Modifier::ITALIC),
            ));
        }

        let visible_height = inner.height as usize;
        let total = all_lines.len();

        let max_scroll = total.saturating_sub(visible_height);
        let effective_scroll = if self.auto_scroll {
            max_scroll
        } else {
            self.scroll_offset.min(max_scroll)
        };

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(effective_scroll)
            .take(visible_height)
            .collect();
        frame.render_widget(Paragraph::new(visible), inner);

        if total > visible_height {
            let mut scrollbar_state = ScrollbarState::new(total)
                .position(effective_scroll)
                .viewport_content_length(visible_height);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut scrollbar_state,
            );
        }

        if !self.auto_scroll && effective_scroll < max_scroll {
            let indicator = Line::styled(
                " ↓ new messages below ",
                Style::default()
                    .fg(theme::BG_BASE)
                    .bg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            );
            let indicator_area = Rect::new(
                inner.x + inner.width.saturating_sub(24),
                inner.y + inner.height.saturating_sub(1),
                24.min(inner.width),
                1,
            );
            frame.render_widget(Paragraph::new(indicator), indicator_area);
        }
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, conversation: &ConversationController) {
        let badge = match self.input_mode {
            ChatInputMode::Insert => Span::styled(" -- INSERT -- ", theme::insert_badge()),
            ChatInputMode::Normal => Span::styled(
                " -- NORMAL -- ",
                Style::default().fg(theme::BG_BASE).bg(theme::TEXT_MUTED),
            ),
        };
        let mut mode_spans = vec![badge];
        if conversation.is_sending() {
            mode_spans.push(Span::raw(" "));
            mode_spans.push(Span::styled(
                "waiting for answer...",
                Style::default().fg(theme::PRIMARY_LIGHT),
            ));
        } else if conversation.last_outcome() == Some(ExchangeOutcome::Failed) {
            mode_spans.push(Span::raw(" "));
            mode_spans.push(Span::styled(
                "last question failed",
                Style::default().fg(theme::WARNING),
            ));
        }

        let chunks = Layout::vertical([
            Constraint::Length(1), // Mode indicator
            Constraint::Min(1),    // Input box
        ])
        .split(area);

        frame.render_widget(Paragraph::new(Line::from(mode_spans)), chunks[0]);
        frame.render_widget(
            self.input_paragraph(conversation.is_sending()),
            chunks[1],
        );
    }

    fn input_paragraph(&self, sending: bool) -> Paragraph<'static> {
        let (border_color, title) = match (self.input_mode, sending) {
            (_, true) => (theme::TEXT_DIM, " Question (waiting) "),
            (ChatInputMode::Insert, false) => (theme::ACCENT, " Question (Esc to exit) "),
            (ChatInputMode::Normal, false) => (theme::TEXT_MUTED, " Question "),
        };

        let text = self.input.text();
        let cursor = self.input.cursor_position();

        let display = if text.is_empty() {
            Line::styled(
                "Ask a question about your documents... (i to type)",
                theme::muted(),
            )
        } else if self.input_mode == ChatInputMode::Insert {
            let before = &text[..cursor];
            let cursor_char = text[cursor..]
                .chars()
                .next()
                .map(|c| c.to_string())
                .unwrap_or_else(|| " ".to_string());
            let after_cursor = if cursor < text.len() {
                &text[cursor + cursor_char.len()..]
            } else {
                ""
            };
            Line::from(vec![
                Span::raw(before.to_string()),
                Span::styled(
                    cursor_char,
                    Style::default().bg(theme::TEXT).fg(theme::BG_BASE),
                ),
                Span::raw(after_cursor.to_string()),
            ])
        } else {
            Line::raw(text.to_string())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title);

        Paragraph::new(display).block(block)
    }
}
