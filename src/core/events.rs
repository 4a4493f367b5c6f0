//! Completion events posted by spawned network tasks.
//!
//! Controllers never await the backend inline: each call runs on its own
//! task and reports back through an unbounded channel, so every state change
//! is applied on the UI task in arrival order.

use tokio::sync::mpsc;

use crate::core::gateway::NetworkError;
use crate::core::models::{Document, DocumentId, HistoryRecord};

/// Sender half handed to controllers.
pub type EventSender = mpsc::UnboundedSender<ClientEvent>;
/// Receiver half drained by the event loop.
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug)]
pub enum ClientEvent {
    Conversation(ConversationEvent),
    Documents(RegistryEvent),
}

#[derive(Debug)]
pub enum ConversationEvent {
    HistoryLoaded(Result<Vec<HistoryRecord>, NetworkError>),
    AnswerReceived(Result<String, NetworkError>),
}

#[derive(Debug)]
pub enum RegistryEvent {
    /// `ticket` is the sequence number the refresh was issued with.
    ListLoaded {
        ticket: u64,
        result: Result<Vec<Document>, NetworkError>,
    },
    UploadFinished(Result<(), NetworkError>),
    DeleteFinished {
        id: DocumentId,
        result: Result<(), NetworkError>,
    },
    DetailLoaded {
        id: DocumentId,
        result: Result<Document, NetworkError>,
    },
}

impl From<ConversationEvent> for ClientEvent {
    fn from(event: ConversationEvent) -> Self {
        Self::Conversation(event)
    }
}

impl From<RegistryEvent> for ClientEvent {
    fn from(event: RegistryEvent) -> Self {
        Self::Documents(event)
    }
}
