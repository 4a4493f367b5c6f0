//! Conversation controller: message history and the one-question-at-a-time
//! send cycle.
//!
//! Each question moves `Idle → Sending → {Answered | Failed} → Idle`. The
//! user's message is echoed into history the moment it is submitted and is
//! never rolled back, even if the backend call fails.

use std::sync::Arc;

use chrono::Utc;

use crate::core::events::{ConversationEvent, EventSender};
use crate::core::gateway::{Backend, NetworkError};
use crate::core::models::{history_to_messages, HistoryRecord, Message, Role};

/// Shown in place of an answer when the chat request fails for any reason.
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Idle,
    Sending,
}

/// How the most recent question resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Answered,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hydration {
    NotStarted,
    Loading,
    Done,
}

/// Cloned, read-only view of the controller for renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub sending: bool,
    pub last_outcome: Option<ExchangeOutcome>,
}

pub struct ConversationController {
    backend: Arc<dyn Backend>,
    events: EventSender,
    messages: Vec<Message>,
    phase: ExchangePhase,
    last_outcome: Option<ExchangeOutcome>,
    hydration: Hydration,
    /// Last locally minted id, so ids stay increasing within a session.
    last_local_id: i64,
}

impl ConversationController {
    pub fn new(backend: Arc<dyn Backend>, events: EventSender) -> Self {
        Self {
            backend,
            events,
            messages: Vec::new(),
            phase: ExchangePhase::Idle,
            last_outcome: None,
            hydration: Hydration::NotStarted,
            last_local_id: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == ExchangePhase::Sending
    }

    pub fn last_outcome(&self) -> Option<ExchangeOutcome> {
        self.last_outcome
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydration == Hydration::Done
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            sending: self.is_sending(),
            last_outcome: self.last_outcome,
        }
    }

    // ── Hydration ────────────────────────────────────────────────────

    /// Fetch the persisted chat log once. Returns false if already started.
    ///
    /// The result replaces the whole history when it lands, including any
    /// messages sent in the meantime.
    pub fn hydrate(&mut self) -> bool {
        if self.hydration != Hydration::NotStarted {
            return false;
        }
        self.hydration = Hydration::Loading;

        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = backend.fetch_history().await;
            let _ = tx.send(ConversationEvent::HistoryLoaded(result).into());
        });
        true
    }

    // ── Sending ──────────────────────────────────────────────────────

    /// Submit a question. Returns false (and does nothing) for blank text or
    /// while another question is in flight.
    pub fn submit(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if self.phase == ExchangePhase::Sending {
            log::debug!("Ignoring submit while a question is in flight");
            return false;
        }

        let message = self.mint(Role::User, text);
        self.messages.push(message);
        self.phase = ExchangePhase::Sending;
        log::info!("Question submitted ({} chars)", text.len());

        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        let question = text.to_string();
        tokio::spawn(async move {
            let result = backend.send_question(question).await;
            let _ = tx.send(ConversationEvent::AnswerReceived(result).into());
        });
        true
    }

    // ── Event handling ───────────────────────────────────────────────

    pub fn handle(&mut self, event: ConversationEvent) {
        match event {
            ConversationEvent::HistoryLoaded(result) => self.on_history_loaded(result),
            ConversationEvent::AnswerReceived(result) => self.on_answer(result),
        }
    }

    fn on_history_loaded(&mut self, result: Result<Vec<HistoryRecord>, NetworkError>) {
        self.hydration = Hydration::Done;
        match result {
            Ok(history) => {
                log::info!("Hydrated {} history records", history.len());
                self.messages = history_to_messages(history);
            }
            Err(e) => {
                log::error!("Error fetching chat history: {e}");
            }
        }
    }

    fn on_answer(&mut self, result: Result<String, NetworkError>) {
        if self.phase != ExchangePhase::Sending {
            log::warn!("Dropping answer that arrived with no question in flight");
            return;
        }

        let (content, outcome) = match result {
            Ok(answer) => (answer, ExchangeOutcome::Answered),
            Err(e) => {
                log::error!("Chat request failed: {e}");
                (FALLBACK_ANSWER.to_string(), ExchangeOutcome::Failed)
            }
        };

        let message = self.mint(Role::Assistant, content);
        self.messages.push(message);
        self.last_outcome = Some(outcome);
        self.phase = ExchangePhase::Idle;
    }

    fn mint(&mut self, role: Role, content: impl Into<String>) -> Message {
        let now = Utc::now();
        let id = now.timestamp_millis().max(self.last_local_id + 1);
        self.last_local_id = id;
        Message::new(id.to_string(), role, content, now.to_rfc3339())
    }
}
