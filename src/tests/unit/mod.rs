//! Controller unit tests
//!
//! Controllers are driven against `MockBackend`. Spawned network tasks report
//! through the client event channel; tests pull each completion off the
//! channel and feed it back through `handle`, exactly as the event loop does.

mod conversation_tests;
mod intake_tests;

use std::time::Duration;

use crate::core::events::{ClientEvent, ConversationEvent, EventReceiver, RegistryEvent};

/// Next completion from a spawned task, failing the test after one second.
pub(crate) async fn next_event(rx: &mut EventReceiver) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a client event")
        .expect("client event channel closed")
}

pub(crate) async fn next_conversation_event(rx: &mut EventReceiver) -> ConversationEvent {
    match next_event(rx).await {
        ClientEvent::Conversation(event) => event,
        other => panic!("expected a conversation event, got {other:?}"),
    }
}

pub(crate) async fn next_registry_event(rx: &mut EventReceiver) -> RegistryEvent {
    match next_event(rx).await {
        ClientEvent::Documents(event) => event,
        other => panic!("expected a registry event, got {other:?}"),
    }
}
