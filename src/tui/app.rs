use std::io;
use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::core::events::{ClientEvent, EventReceiver};

use super::events::{Action, AppEvent, Focus, Notification, NotificationLevel};
use super::layout::AppLayout;
use super::services::Services;
use super::theme;
use super::views::chat::{ChatInputMode, ChatState};
use super::views::documents::DocumentsState;

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Currently focused panel.
    pub focus: Focus,
    pub chat: ChatState,
    pub documents: DocumentsState,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    /// Monotonic counter for notification IDs.
    notification_counter: u64,
    /// Whether the help modal is open.
    pub show_help: bool,
    /// Last known terminal area, for mouse hit-testing.
    viewport: Rect,
    /// Receiver for UI events (notifications, actions).
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Receiver for network completions.
    client_rx: EventReceiver,
    /// Controllers and the backend handle.
    services: Services,
}

impl AppState {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        client_rx: EventReceiver,
        services: Services,
    ) -> Self {
        Self {
            running: true,
            focus: Focus::Chat,
            chat: ChatState::new(),
            documents: DocumentsState::new(),
            notifications: Vec::new(),
            notification_counter: 0,
            show_help: false,
            viewport: Rect::default(),
            event_rx,
            client_rx,
            services,
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Kick off the initial document refresh and history load.
    pub fn start(&mut self) {
        self.services.registry.refresh();
        self.services.conversation.hydrate();
    }

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        self.start();

        while self.running {
            let size = terminal.size()?;
            self.viewport = Rect::new(0, 0, size.width, size.height);

            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(event) = self.client_rx.recv() => {
                    self.handle_client_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_client_event(&mut self, event: ClientEvent) {
        self.services.apply(event);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => self.handle_input(crossterm_event),
            AppEvent::Action(action) => self.handle_action(action),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    fn handle_input(&mut self, event: Event) {
        // Priority 1: Ctrl+C always quits
        if let Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            self.handle_action(Action::Quit);
            return;
        }

        // Priority 2: Upload alert blocks until acknowledged
        if self.services.registry.alert().is_some() {
            if let Some(action) = map_alert_input(&event) {
                self.handle_action(action);
            }
            return;
        }

        // Priority 3: Help modal
        if self.show_help {
            if let Some(action) = map_help_input(&event) {
                self.handle_action(action);
            }
            return;
        }

        // Priority 4: Window focus and mouse
        match &event {
            Event::FocusLost => {
                self.services.intake.drag_leave();
                return;
            }
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    self.focus_at(Position::new(mouse.column, mouse.row));
                }
                return;
            }
            _ => {}
        }

        // Priority 5: Focused view
        let consumed = match self.focus {
            Focus::Chat => self.chat.handle_input(&event, &mut self.services),
            Focus::Documents => self.documents.handle_input(&event, &mut self.services),
        };
        if consumed {
            return;
        }

        // Priority 6: Pasted paths dropped anywhere else become an upload
        if let Event::Paste(text) = &event {
            self.documents.drop_paths(text, &mut self.services);
            return;
        }

        // Priority 7: Global keybindings
        if let Some(action) = map_input_to_action(&event) {
            self.handle_action(action);
        }
    }

    fn focus_at(&mut self, position: Position) {
        let layout = AppLayout::compute(self.viewport, self.focus);
        if layout.documents.is_some_and(|r| r.contains(position)) {
            self.focus = Focus::Documents;
        } else if layout.chat.is_some_and(|r| r.contains(position)) {
            self.focus = Focus::Chat;
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusChat => self.focus = Focus::Chat,
            Action::FocusDocuments => self.focus = Focus::Documents,
            Action::TabNext => self.focus = self.focus.next(),
            Action::TabPrev => self.focus = self.focus.prev(),
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
            Action::DismissAlert => self.services.registry.dismiss_alert(),
            Action::RefreshDocuments => {
                self.services.registry.refresh();
            }
        }
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        self.notifications.push(Notification {
            id: self.notification_counter,
            message,
            level,
            ttl_ticks: 100,
        });

        while self.notifications.len() > 3 {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired, advance animations.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);
        self.chat.on_tick();
        self.documents.on_tick();
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = AppLayout::compute(area, self.focus);

        if let Some(docs_area) = layout.documents {
            self.documents.render(
                frame,
                docs_area,
                &self.services,
                self.focus == Focus::Documents,
            );
        }
        if let Some(chat_area) = layout.chat {
            self.chat.render(
                frame,
                chat_area,
                &self.services.conversation,
                self.focus == Focus::Chat,
            );
        }

        self.render_status_bar(frame, layout.status);

        // Overlays
        self.render_notifications(frame, area);

        if self.show_help {
            self.render_help_modal(frame, area);
        }

        if let Some(alert) = self.services.registry.alert() {
            render_alert(frame, area, alert);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let chat_status = if self.services.conversation.is_sending() {
            Span::styled("answering", Style::default().fg(theme::PRIMARY_LIGHT))
        } else {
            Span::styled("ready", theme::muted())
        };

        let mode_indicator = match self.chat.input_mode() {
            ChatInputMode::Insert if self.focus == Focus::Chat => {
                Span::styled(" INSERT ", theme::insert_badge())
            }
            _ => Span::raw(""),
        };

        let counts = self.services.registry.status_counts();

        let status = Line::from(vec![
            Span::styled(" SPECTRON ", theme::brand_badge()),
            Span::raw(" "),
            mode_indicator,
            Span::raw(" "),
            Span::styled(
                self.focus.label(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            Span::styled("Chat:", theme::key_hint()),
            Span::raw(" "),
            chat_status,
            Span::raw(" │ "),
            Span::styled(
                format!("✓{}", counts.ready),
                Style::default().fg(theme::SUCCESS),
            ),
            Span::raw(" "),
            Span::styled(
                format!("⟳{}", counts.in_flight),
                Style::default().fg(theme::INFO),
            ),
            Span::raw(" "),
            Span::styled(
                format!("✗{}", counts.failed),
                Style::default().fg(theme::ERROR),
            ),
            Span::raw(" │ "),
            Span::styled(self.services.base_url.clone(), theme::dim()),
            Span::raw(" │ "),
            Span::styled("Tab", theme::key_hint()),
            Span::raw(":switch "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 50.min(area.width.saturating_sub(2));
        let height = self.notifications.len() as u16;
        let x = area.width.saturating_sub(max_width + 1);
        let y = 1;

        let notification_area = Rect::new(x, y, max_width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(format!(" {prefix} "), Style::default().fg(color).bold()),
                    Span::raw(n.message.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 80, area);

        let keybindings = [
            ("Global:", ""),
            ("q", "Quit application"),
            ("?", "Toggle this help"),
            ("Tab / Shift+Tab", "Switch panel"),
            ("1 / 2", "Chat / Documents"),
            ("r", "Refresh documents"),
            ("Ctrl+C", "Force quit"),
            ("", ""),
            ("Chat:", ""),
            ("i / Enter", "Enter insert mode"),
            ("Enter (insert)", "Send question"),
            ("Esc", "Exit insert mode"),
            ("j/k", "Scroll messages"),
            ("G / g", "Jump to bottom / top"),
            ("", ""),
            ("Documents:", ""),
            ("a", "Add files by path"),
            ("paste / drop", "Upload dropped files"),
            ("d", "Delete selected document"),
            ("Enter", "Show document details"),
            ("j/k", "Move selection"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                " Keybindings",
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];

        for (key, desc) in &keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {key}"),
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<22}", key),
                        Style::default().fg(theme::PRIMARY_LIGHT).bold(),
                    ),
                    Span::raw(*desc),
                ]));
            }
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("?", Style::default().fg(theme::PRIMARY_LIGHT).bold()),
            Span::raw(" or "),
            Span::styled("Esc", Style::default().fg(theme::PRIMARY_LIGHT).bold()),
            Span::raw(" to close"),
        ]));

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

// ── Input mapping ───────────────────────────────────────────────────────

fn map_alert_input(event: &Event) -> Option<Action> {
    let Event::Key(KeyEvent {
        code,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };
    match code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Some(Action::DismissAlert),
        _ => None,
    }
}

fn map_help_input(event: &Event) -> Option<Action> {
    let Event::Key(KeyEvent {
        code,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };
    match code {
        KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
        _ => None,
    }
}

fn map_input_to_action(event: &Event) -> Option<Action> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };

    match (*modifiers, *code) {
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ShowHelp),
            KeyCode::Char('r') => Some(Action::RefreshDocuments),
            KeyCode::Tab => Some(Action::TabNext),
            KeyCode::BackTab => Some(Action::TabPrev),
            KeyCode::Char('1') => Some(Focus::Chat.to_action()),
            KeyCode::Char('2') => Some(Focus::Documents.to_action()),
            _ => None,
        },
        _ => None,
    }
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let modal = centered_rect(40, 30, area);

    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            format!("  {message}"),
            Style::default()
                .fg(theme::ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::styled("  Press Enter to dismiss", theme::key_hint()),
    ];

    let block = Block::default()
        .title(" Upload ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ERROR));

    frame.render_widget(Clear, modal);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        modal,
    );
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
