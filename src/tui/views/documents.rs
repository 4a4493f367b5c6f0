//! Documents view: uploaded document list, upload drop zone and details.
//!
//! The list itself belongs to [`DocumentRegistry`]; this view keeps the
//! selection, the add-files prompt and turns pasted paths into drops.
//!
//! [`DocumentRegistry`]: crate::core::registry::DocumentRegistry

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::super::theme;

use crate::core::intake::{accepted_hint, parse_dropped_paths};
use crate::core::models::{format_file_size, Document, DocumentId};
use crate::core::registry::DocumentRegistry;
use crate::tui::events::NotificationLevel;
use crate::tui::services::Services;
use crate::tui::widgets::input_buffer::InputBuffer;

// ============================================================================
// Types
// ============================================================================

enum DocumentsModal {
    /// Path prompt standing in for a file picker.
    AddFiles { input: InputBuffer },
}

/// Ticks the drop zone stays highlighted after a paste-drop lands.
const DROP_FLASH_TICKS: u8 = 5;

pub struct DocumentsState {
    selected: usize,
    modal: Option<DocumentsModal>,
    drop_flash: u8,
}

impl Default for DocumentsState {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentsState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            modal: None,
            drop_flash: 0,
        }
    }

    pub fn on_tick(&mut self) {
        self.drop_flash = self.drop_flash.saturating_sub(1);
    }

    /// Whether the drop zone should render highlighted this frame.
    pub fn drop_zone_active(&self, services: &Services) -> bool {
        services.intake.is_drag_active() || self.drop_flash > 0
    }

    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }

    pub fn open_add_modal(&mut self) {
        self.modal = Some(DocumentsModal::AddFiles {
            input: InputBuffer::new(),
        });
    }

    fn selected_index(&self, registry: &DocumentRegistry) -> Option<usize> {
        let len = registry.documents().len();
        (len > 0).then(|| self.selected.min(len - 1))
    }

    pub fn selected_id(&self, registry: &DocumentRegistry) -> Option<DocumentId> {
        self.selected_index(registry)
            .map(|i| registry.documents()[i].id)
    }

    // ── Uploads ──────────────────────────────────────────────────────

    /// Treat pasted text as files dropped on the upload zone.
    pub fn drop_paths(&mut self, text: &str, services: &mut Services) {
        services.intake.drag_enter();
        self.drop_flash = DROP_FLASH_TICKS;
        let files = parse_dropped_paths(text);
        let count = files.len();
        if services.intake.drop(files, &mut services.registry) {
            services.notify(
                format!("Uploading {count} file(s)..."),
                NotificationLevel::Info,
            );
        } else {
            services.notify("Nothing to upload in drop", NotificationLevel::Warning);
        }
    }

    fn submit_add_modal(&mut self, text: &str, services: &mut Services) {
        let files = parse_dropped_paths(text);
        let count = files.len();
        if services.intake.select(files, &mut services.registry) {
            services.notify(
                format!("Uploading {count} file(s)..."),
                NotificationLevel::Info,
            );
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &mut Services) -> bool {
        if let Event::Paste(text) = event {
            match &mut self.modal {
                Some(DocumentsModal::AddFiles { input }) => input.insert_str(text),
                None => self.drop_paths(text, services),
            }
            return true;
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

        // Modal consumes all input when open
        if self.modal.is_some() {
            return self.handle_modal_input(*code, *modifiers, services);
        }

        if services.registry.detail().is_some() {
            return match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                    services.registry.close_detail();
                    true
                }
                _ => true,
            };
        }

        self.handle_list_input(*code, *modifiers, services)
    }

    fn handle_list_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        services: &mut Services,
    ) -> bool {
        let len = services.registry.documents().len();
        match (modifiers, code) {
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.selected = self.selected.min(len.saturating_sub(1)).saturating_sub(1);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('g') | KeyCode::Home) => {
                self.selected = 0;
                true
            }
            (KeyModifiers::SHIFT, KeyCode::Char('G')) | (KeyModifiers::NONE, KeyCode::End) => {
                self.selected = len.saturating_sub(1);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                services.registry.refresh();
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('a')) => {
                self.open_add_modal();
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('d') | KeyCode::Delete) => {
                if let Some(id) = self.selected_id(&services.registry) {
                    services.registry.remove(id);
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                if let Some(id) = self.selected_id(&services.registry) {
                    services.registry.inspect(id);
                }
                true
            }
            _ => false,
        }
    }

    fn handle_modal_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        services: &mut Services,
    ) -> bool {
        let Some(DocumentsModal::AddFiles { input }) = &mut self.modal else {
            return false;
        };

        match (modifiers, code) {
            (_, KeyCode::Esc) => {
                self.modal = None;
            }
            (_, KeyCode::Enter) => {
                let text = input.take();
                self.modal = None;
                self.submit_add_modal(&text, services);
            }
            (_, KeyCode::Backspace) => input.backspace(),
            (_, KeyCode::Delete) => input.delete(),
            (_, KeyCode::Left) => input.move_left(),
            (_, KeyCode::Right) => input.move_right(),
            (_, KeyCode::Home) => input.move_home(),
            (_, KeyCode::End) => input.move_end(),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => input.clear(),
            (_, KeyCode::Char(c)) => input.insert_char(c),
            _ => {}
        }
        true
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, services: &Services, focused: bool) {
        let registry = &services.registry;
        let drag_active = self.drop_zone_active(services);

        let title = format!("Documents ({})", registry.documents().len());
        let mut block = if drag_active {
            theme::block_drop_zone(&title, true)
        } else if focused {
            theme::block_focused(&title)
        } else {
            theme::block_default(&title)
        };

        let activity = match (registry.uploads_in_flight(), registry.is_refreshing()) {
            (0, false) => None,
            (0, true) => Some("refreshing...".to_string()),
            (n, _) => Some(format!("uploading {n}...")),
        };
        if let Some(activity) = activity {
            block = block.title(
                Line::styled(format!(" {activity} "), Style::default().fg(theme::INFO))
                    .alignment(Alignment::Right),
            );
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(3), // Drop zone
            Constraint::Min(1),    // List
            Constraint::Length(1), // Key hints
        ])
        .split(inner);

        self.render_drop_zone(frame, chunks[0], drag_active);
        self.render_list(frame, chunks[1], registry);

        let hints = Line::styled(
            " a:add  d:delete  r:refresh  Enter:details",
            theme::key_hint(),
        );
        frame.render_widget(Paragraph::new(hints), chunks[2]);

        if let Some(doc) = registry.detail() {
            render_detail(frame, area, doc);
        }
        if let Some(DocumentsModal::AddFiles { input }) = &self.modal {
            render_add_modal(frame, area, input);
        }
    }

    fn render_drop_zone(&self, frame: &mut Frame, area: Rect, drag_active: bool) {
        let (headline, style) = if drag_active {
            ("Drop files to upload", theme::highlight())
        } else {
            ("Drop files here or press a to add", theme::muted())
        };
        let lines = vec![
            Line::styled(format!(" {headline}"), style),
            Line::styled(format!(" Accepted: {}", accepted_hint()), theme::dim()),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, registry: &DocumentRegistry) {
        let docs = registry.documents();

        if docs.is_empty() {
            let text = if registry.is_refreshing() {
                "Loading documents..."
            } else {
                "No documents uploaded yet"
            };
            let empty = Paragraph::new(vec![
                Line::raw(""),
                Line::styled(format!("  {text}"), theme::muted()),
            ]);
            frame.render_widget(empty, area);
            return;
        }

        // Two lines per document.
        let per_page = (area.height as usize / 2).max(1);
        let selected = self.selected_index(registry).unwrap_or(0);
        let start = (selected + 1).saturating_sub(per_page);

        let lines: Vec<Line> = docs
            .iter()
            .enumerate()
            .skip(start)
            .take(per_page)
            .flat_map(|(i, doc)| {
                document_lines(doc, i == selected, registry.failed_delete() == Some(doc.id))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }
}

// ── Line builders ────────────────────────────────────────────────────────────

fn document_lines(doc: &Document, selected: bool, delete_failed: bool) -> [Line<'static>; 2] {
    let marker = if selected { "▸ " } else { "  " };
    let name_style = if selected {
        theme::highlight()
    } else {
        Style::default().fg(theme::TEXT)
    };

    let name = Line::from(vec![
        Span::styled(marker, theme::highlight()),
        Span::styled(
            format!("{} ", doc.status.glyph()),
            Style::default().fg(theme::status_color(doc.status)),
        ),
        Span::styled(doc.original_name.clone(), name_style),
    ]);

    let mut meta = vec![
        Span::raw("    "),
        Span::styled(format_file_size(doc.file_size), theme::muted()),
        Span::styled(" · ", theme::dim()),
        Span::styled(
            doc.status.label(),
            Style::default().fg(theme::status_color(doc.status)),
        ),
    ];
    if let Some(chunks) = doc.chunks() {
        meta.push(Span::styled(format!(" · {chunks} chunks"), theme::muted()));
    }
    if let Some(error) = doc.failure() {
        meta.push(Span::styled(
            format!(" · {error}"),
            Style::default().fg(theme::ERROR),
        ));
    }
    if delete_failed {
        meta.push(Span::styled(
            " · delete failed",
            Style::default()
                .fg(theme::ERROR)
                .add_modifier(Modifier::BOLD),
        ));
    }

    [name, Line::from(meta)]
}

fn detail_row(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<10}"), theme::muted()),
        Span::raw(value),
    ])
}

fn render_detail(frame: &mut Frame, area: Rect, doc: &Document) {
    let modal_area = centered_fixed(56, 12, area);
    frame.render_widget(Clear, modal_area);

    let mut lines = vec![
        Line::raw(""),
        detail_row("Name", doc.original_name.clone()),
        detail_row("Id", doc.id.to_string()),
        detail_row(
            "Status",
            format!("{} {}", doc.status.glyph(), doc.status.label()),
        ),
        detail_row("Size", format_file_size(doc.file_size)),
    ];
    if let Some(content_type) = &doc.content_type {
        lines.push(detail_row("Type", content_type.clone()));
    }
    if let Some(uploaded_at) = &doc.uploaded_at {
        lines.push(detail_row("Uploaded", uploaded_at.clone()));
    }
    if let Some(chunks) = doc.chunks() {
        lines.push(detail_row("Chunks", chunks.to_string()));
    }
    if let Some(error) = doc.failure() {
        lines.push(Line::from(vec![
            Span::styled("  Error     ", theme::muted()),
            Span::styled(error.to_string(), Style::default().fg(theme::ERROR)),
        ]));
    }

    let block = Block::default()
        .title(" Document ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title_bottom(Line::styled(" Esc to close ", theme::key_hint()));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        modal_area,
    );
}

fn render_add_modal(frame: &mut Frame, area: Rect, input: &InputBuffer) {
    let modal_area = centered_fixed(60, 8, area);
    frame.render_widget(Clear, modal_area);

    let lines = vec![
        Line::raw(""),
        Line::styled("  File paths (space separated, quote names with spaces)", theme::muted()),
        Line::from(vec![
            Span::styled("  > ", theme::highlight()),
            Span::raw(input.text().to_string()),
            Span::styled("█", Style::default().fg(theme::ACCENT)),
        ]),
        Line::raw(""),
        Line::styled(format!("  Accepted: {}", accepted_hint()), theme::dim()),
    ];

    let block = Block::default()
        .title(" Add Documents ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title_bottom(Line::styled(" Enter to upload · Esc to cancel ", theme::key_hint()));

    frame.render_widget(Paragraph::new(lines).block(block), modal_area);
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Compute a centered rectangle with fixed dimensions.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
