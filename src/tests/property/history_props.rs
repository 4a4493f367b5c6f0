//! Property-based tests for history hydration and document formatting
//!
//! Tests invariants:
//! - A history log of n records yields 2n messages
//! - Messages alternate user/assistant, oldest exchange first
//! - Message ids are derived from record ids and never collide
//! - File sizes always format with a known unit

use std::collections::HashSet;

use proptest::prelude::*;

use crate::core::models::{format_file_size, history_to_messages, HistoryRecord, Role};

// ============================================================================
// Strategies
// ============================================================================

/// A newest-first history log with unique, descending ids.
fn arb_history() -> impl Strategy<Value = Vec<HistoryRecord>> {
    prop::collection::btree_set(1i64..100_000, 0..30).prop_flat_map(|ids| {
        let ids: Vec<i64> = ids.into_iter().rev().collect();
        let len = ids.len();
        (
            Just(ids),
            prop::collection::vec(("[a-zA-Z0-9 ?]{0,40}", "[a-zA-Z0-9 .]{0,40}"), len),
        )
            .prop_map(|(ids, texts)| {
                ids.into_iter()
                    .zip(texts)
                    .map(|(id, (question, answer))| HistoryRecord {
                        id,
                        question,
                        answer,
                        timestamp: "2024-01-01T00:00:00Z".to_string(),
                    })
                    .collect()
            })
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_history_doubles_into_messages(history in arb_history()) {
        let n = history.len();
        let messages = history_to_messages(history);
        prop_assert_eq!(messages.len(), 2 * n);
    }

    #[test]
    fn prop_roles_alternate_starting_with_user(history in arb_history()) {
        let messages = history_to_messages(history);
        for (i, message) in messages.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            prop_assert_eq!(message.role, expected);
        }
    }

    #[test]
    fn prop_oldest_exchange_comes_first(history in arb_history()) {
        let oldest = history.last().cloned();
        let messages = history_to_messages(history);
        if let Some(record) = oldest {
            prop_assert_eq!(&messages[0].id, &format!("q-{}", record.id));
            prop_assert_eq!(&messages[0].content, &record.question);
            prop_assert_eq!(&messages[1].id, &format!("a-{}", record.id));
            prop_assert_eq!(&messages[1].content, &record.answer);
        }
    }

    #[test]
    fn prop_message_ids_are_unique(history in arb_history()) {
        let messages = history_to_messages(history);
        let ids: HashSet<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        prop_assert_eq!(ids.len(), messages.len());
    }

    #[test]
    fn prop_file_size_has_unit(bytes in any::<u64>()) {
        let text = format_file_size(bytes);
        let unit = text.rsplit(' ').next().unwrap_or_default();
        prop_assert!(["Bytes", "KB", "MB", "GB"].contains(&unit), "{}", text);
    }

    #[test]
    fn prop_small_sizes_are_exact_bytes(bytes in 1u64..1024) {
        prop_assert_eq!(format_file_size(bytes), format!("{bytes} Bytes"));
    }
}
