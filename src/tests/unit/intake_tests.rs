//! Upload intake tests
//!
//! The intake only forwards non-empty file sets and always ends a drag.

use std::sync::Arc;

use crate::core::events::{self, RegistryEvent};
use crate::core::intake::{parse_dropped_paths, UploadIntake};
use crate::core::models::UploadFile;
use crate::core::registry::DocumentRegistry;
use crate::tests::mocks::MockBackend;

use super::next_registry_event;

#[tokio::test]
async fn test_drop_forwards_files_and_clears_drag() {
    let mut backend = MockBackend::new();
    backend
        .expect_upload_files()
        .withf(|files| files.len() == 2)
        .times(1)
        .returning(|_| Ok(()));
    backend.expect_list_documents().returning(|| Ok(vec![]));
    let (tx, mut rx) = events::channel();
    let mut registry = DocumentRegistry::new(Arc::new(backend), tx);
    let mut intake = UploadIntake::new();

    intake.drag_enter();
    intake.drag_over();
    let files = parse_dropped_paths("/tmp/one.pdf\n/tmp/two.md");
    assert!(intake.drop(files, &mut registry));

    assert!(!intake.is_drag_active());
    assert_eq!(registry.uploads_in_flight(), 1);
    assert!(matches!(
        next_registry_event(&mut rx).await,
        RegistryEvent::UploadFinished(Ok(()))
    ));
}

#[tokio::test]
async fn test_empty_drop_clears_drag_without_upload() {
    let (tx, _rx) = events::channel();
    let mut registry = DocumentRegistry::new(Arc::new(MockBackend::new()), tx);
    let mut intake = UploadIntake::new();

    intake.drag_enter();
    assert!(!intake.drop(vec![], &mut registry));

    assert!(!intake.is_drag_active());
    assert_eq!(registry.uploads_in_flight(), 0);
}

#[tokio::test]
async fn test_select_forwards_unusual_extensions_too() {
    let mut backend = MockBackend::new();
    backend.expect_upload_files().returning(|_| Ok(()));
    let (tx, _rx) = events::channel();
    let mut registry = DocumentRegistry::new(Arc::new(backend), tx);
    let mut intake = UploadIntake::new();

    assert!(intake.select(
        vec![UploadFile::from_bytes("photo.png", vec![1, 2, 3])],
        &mut registry
    ));
    assert_eq!(registry.uploads_in_flight(), 1);
}

#[tokio::test]
async fn test_empty_selection_is_noop() {
    let (tx, _rx) = events::channel();
    let mut registry = DocumentRegistry::new(Arc::new(MockBackend::new()), tx);
    let mut intake = UploadIntake::new();

    assert!(!intake.select(vec![], &mut registry));
    assert_eq!(registry.uploads_in_flight(), 0);
}
