//! Conversation controller tests
//!
//! Covers the send cycle (echo, answer, fallback), the single-flight gate,
//! and history hydration.

use std::sync::Arc;

use crate::core::conversation::{
    ConversationController, ExchangeOutcome, ExchangePhase, FALLBACK_ANSWER,
};
use crate::core::events::{self, ConversationEvent, EventReceiver};
use crate::core::gateway::NetworkError;
use crate::core::models::Role;
use crate::tests::history;
use crate::tests::mocks::MockBackend;

use super::next_conversation_event;

fn controller(backend: MockBackend) -> (ConversationController, EventReceiver) {
    let (tx, rx) = events::channel();
    (ConversationController::new(Arc::new(backend), tx), rx)
}

fn server_error() -> NetworkError {
    NetworkError::Status {
        status: 500,
        body: "boom".to_string(),
    }
}

// ============================================================================
// Send cycle
// ============================================================================

#[tokio::test]
async fn test_question_is_echoed_before_answer_arrives() {
    let mut backend = MockBackend::new();
    backend
        .expect_send_question()
        .times(1)
        .returning(|_| Ok("Paris".to_string()));
    let (mut convo, mut rx) = controller(backend);

    assert!(convo.submit("Capital of France?"));

    assert_eq!(convo.phase(), ExchangePhase::Sending);
    assert_eq!(convo.messages().len(), 1);
    assert_eq!(convo.messages()[0].role, Role::User);
    assert_eq!(convo.messages()[0].content, "Capital of France?");

    convo.handle(next_conversation_event(&mut rx).await);

    assert_eq!(convo.phase(), ExchangePhase::Idle);
    assert_eq!(convo.last_outcome(), Some(ExchangeOutcome::Answered));
    let last = convo.messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "Paris");
}

#[tokio::test]
async fn test_failed_request_appends_fallback_and_keeps_question() {
    let mut backend = MockBackend::new();
    backend
        .expect_send_question()
        .times(1)
        .returning(|_| Err(server_error()));
    let (mut convo, mut rx) = controller(backend);

    convo.submit("Will this work?");
    convo.handle(next_conversation_event(&mut rx).await);

    let messages = convo.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "Will this work?");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, FALLBACK_ANSWER);
    assert_eq!(convo.last_outcome(), Some(ExchangeOutcome::Failed));
    assert!(!convo.is_sending());
}

#[tokio::test]
async fn test_second_submit_rejected_while_sending() {
    let mut backend = MockBackend::new();
    backend
        .expect_send_question()
        .times(1)
        .returning(|_| Ok("one".to_string()));
    let (mut convo, mut rx) = controller(backend);

    assert!(convo.submit("first"));
    assert!(!convo.submit("second"));
    assert_eq!(convo.messages().len(), 1);

    convo.handle(next_conversation_event(&mut rx).await);
    assert_eq!(convo.messages().len(), 2);
    assert!(rx.try_recv().is_err(), "only one request may be in flight");
}

#[tokio::test]
async fn test_submit_allowed_again_after_answer() {
    let mut backend = MockBackend::new();
    backend
        .expect_send_question()
        .times(2)
        .returning(|q| Ok(format!("re: {q}")));
    let (mut convo, mut rx) = controller(backend);

    convo.submit("a");
    convo.handle(next_conversation_event(&mut rx).await);
    assert!(convo.submit("b"));
    convo.handle(next_conversation_event(&mut rx).await);

    let contents: Vec<&str> = convo.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["a", "re: a", "b", "re: b"]);
}

#[tokio::test]
async fn test_blank_questions_are_rejected() {
    let (mut convo, _rx) = controller(MockBackend::new());

    assert!(!convo.submit(""));
    assert!(!convo.submit("   \t\n"));
    assert!(convo.messages().is_empty());
    assert_eq!(convo.phase(), ExchangePhase::Idle);
}

#[tokio::test]
async fn test_question_is_sent_as_typed() {
    let mut backend = MockBackend::new();
    backend
        .expect_send_question()
        .withf(|q| q == "  spaced out  ")
        .times(1)
        .returning(|_| Ok("ok".to_string()));
    let (mut convo, mut rx) = controller(backend);

    convo.submit("  spaced out  ");
    convo.handle(next_conversation_event(&mut rx).await);
    assert_eq!(convo.messages()[0].content, "  spaced out  ");
}

#[tokio::test]
async fn test_answer_without_question_is_dropped() {
    let (mut convo, _rx) = controller(MockBackend::new());

    convo.handle(ConversationEvent::AnswerReceived(Ok("stray".to_string())));

    assert!(convo.messages().is_empty());
    assert_eq!(convo.last_outcome(), None);
}

#[tokio::test]
async fn test_local_message_ids_are_unique_and_increasing() {
    let mut backend = MockBackend::new();
    backend
        .expect_send_question()
        .returning(|_| Ok("ok".to_string()));
    let (mut convo, mut rx) = controller(backend);

    for q in ["x", "y", "z"] {
        convo.submit(q);
        convo.handle(next_conversation_event(&mut rx).await);
    }

    let ids: Vec<i64> = convo
        .messages()
        .iter()
        .map(|m| m.id.parse().unwrap())
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids: {ids:?}");
}

// ============================================================================
// Hydration
// ============================================================================

#[tokio::test]
async fn test_hydrate_orders_history_chronologically() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_history().times(1).returning(|| {
        Ok(vec![
            history(3, "q3", "a3"),
            history(2, "q2", "a2"),
            history(1, "q1", "a1"),
        ])
    });
    let (mut convo, mut rx) = controller(backend);

    assert!(convo.hydrate());
    convo.handle(next_conversation_event(&mut rx).await);

    let ids: Vec<&str> = convo.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["q-1", "a-1", "q-2", "a-2", "q-3", "a-3"]);
    assert!(convo.is_hydrated());
}

#[tokio::test]
async fn test_hydrate_runs_once() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_history()
        .times(1)
        .returning(|| Ok(vec![]));
    let (mut convo, mut rx) = controller(backend);

    assert!(convo.hydrate());
    assert!(!convo.hydrate());
    convo.handle(next_conversation_event(&mut rx).await);
    assert!(!convo.hydrate());
}

#[tokio::test]
async fn test_hydrate_failure_leaves_thread_empty() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_history()
        .returning(|| Err(server_error()));
    let (mut convo, mut rx) = controller(backend);

    convo.hydrate();
    convo.handle(next_conversation_event(&mut rx).await);

    assert!(convo.messages().is_empty());
    assert!(convo.is_hydrated());
}

#[tokio::test]
async fn test_late_history_replaces_messages_sent_meanwhile() {
    let (mut convo, _rx) = controller({
        let mut backend = MockBackend::new();
        backend
            .expect_send_question()
            .returning(|_| Ok("never delivered".to_string()));
        backend.expect_fetch_history().returning(|| Ok(vec![]));
        backend
    });

    convo.hydrate();
    convo.submit("typed before history landed");
    convo.handle(ConversationEvent::HistoryLoaded(Ok(vec![history(
        1, "old q", "old a",
    )])));

    let contents: Vec<&str> = convo.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["old q", "old a"]);
    // The question is still in flight; its answer will append after history.
    assert!(convo.is_sending());
}

#[tokio::test]
async fn test_snapshot_reflects_state() {
    let (convo, _rx) = controller(MockBackend::new());
    let snapshot = convo.snapshot();
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.sending);
    assert_eq!(snapshot.last_outcome, None);
}
