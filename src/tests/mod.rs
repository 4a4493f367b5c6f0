//! Crate-internal test suites and shared fixtures.

mod property;
mod unit;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::events::{self, EventReceiver};
use crate::core::models::{Document, DocumentId, DocumentStatus, HistoryRecord};
use crate::tui::events::AppEvent;
use crate::tui::services::Services;

use mocks::MockBackend;

/// Wire a mock backend into a full set of controllers.
///
/// Returns the services plus the receivers for network completions and UI
/// events; keep both alive for the duration of the test.
pub(crate) fn test_services(
    backend: MockBackend,
) -> (Services, EventReceiver, mpsc::UnboundedReceiver<AppEvent>) {
    let (client_tx, client_rx) = events::channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let services = Services::with_backend(
        Arc::new(backend),
        client_tx,
        event_tx,
        "http://test.invalid/api".to_string(),
    );
    (services, client_rx, event_rx)
}

pub(crate) fn document(id: DocumentId, name: &str, status: DocumentStatus) -> Document {
    Document {
        id,
        original_name: name.to_string(),
        file_size: 1024,
        status,
        chunk_count: None,
        error_message: None,
        content_type: None,
        uploaded_at: None,
    }
}

pub(crate) fn history(id: i64, question: &str, answer: &str) -> HistoryRecord {
    HistoryRecord {
        id,
        question: question.to_string(),
        answer: answer.to_string(),
        timestamp: format!("2024-01-0{}T10:00:00Z", id % 9 + 1),
    }
}
