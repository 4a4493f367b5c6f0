//! Document registry: client-side mirror of the server's document list.
//!
//! The list is never patched locally. Every successful mutation triggers a
//! full re-fetch, and each fetch result replaces the list wholesale. Fetches
//! carry increasing tickets so that a slow, older response cannot overwrite
//! a newer list that already landed.

use std::sync::Arc;

use crate::core::events::{EventSender, RegistryEvent};
use crate::core::gateway::{Backend, NetworkError};
use crate::core::models::{Document, DocumentId, DocumentStatus, UploadFile};

/// Alert text when the backend rejects an upload.
pub const UPLOAD_REJECTED_ALERT: &str = "Failed to upload file";
/// Alert text when the upload never reached the backend.
pub const UPLOAD_ERROR_ALERT: &str = "Error uploading file";

/// Per-status tallies for headers and status bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub ready: usize,
    pub in_flight: usize,
    pub failed: usize,
}

/// Cloned, read-only view of the registry for renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    pub documents: Vec<Document>,
    pub refreshing: bool,
    pub uploads_in_flight: usize,
    pub alert: Option<String>,
    pub failed_delete: Option<DocumentId>,
}

pub struct DocumentRegistry {
    backend: Arc<dyn Backend>,
    events: EventSender,
    documents: Vec<Document>,
    /// Ticket of the most recently issued refresh.
    issued: u64,
    /// Ticket of the refresh whose list is currently shown.
    applied: u64,
    refreshes_in_flight: usize,
    uploads_in_flight: usize,
    /// Blocking alert; stays until dismissed.
    alert: Option<String>,
    /// Last document whose deletion the backend refused.
    failed_delete: Option<DocumentId>,
    detail: Option<Document>,
}

impl DocumentRegistry {
    pub fn new(backend: Arc<dyn Backend>, events: EventSender) -> Self {
        Self {
            backend,
            events,
            documents: Vec::new(),
            issued: 0,
            applied: 0,
            refreshes_in_flight: 0,
            uploads_in_flight: 0,
            alert: None,
            failed_delete: None,
            detail: None,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshes_in_flight > 0
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.uploads_in_flight
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn failed_delete(&self) -> Option<DocumentId> {
        self.failed_delete
    }

    pub fn detail(&self) -> Option<&Document> {
        self.detail.as_ref()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.documents
            .iter()
            .fold(StatusCounts::default(), |mut counts, doc| {
                match doc.status {
                    status if status.is_in_flight() => counts.in_flight += 1,
                    DocumentStatus::Failed => counts.failed += 1,
                    _ => counts.ready += 1,
                }
                counts
            })
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            documents: self.documents.clone(),
            refreshing: self.is_refreshing(),
            uploads_in_flight: self.uploads_in_flight,
            alert: self.alert.clone(),
            failed_delete: self.failed_delete,
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Re-fetch the full list. Returns the ticket the request carries.
    pub fn refresh(&mut self) -> u64 {
        self.issued += 1;
        let ticket = self.issued;
        self.refreshes_in_flight += 1;

        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = backend.list_documents().await;
            let _ = tx.send(RegistryEvent::ListLoaded { ticket, result }.into());
        });
        ticket
    }

    /// Send a file set to the backend. Empty sets are ignored.
    pub fn submit_upload(&mut self, files: Vec<UploadFile>) -> bool {
        if files.is_empty() {
            return false;
        }
        log::info!("Uploading {} file(s)", files.len());
        self.uploads_in_flight += 1;

        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = backend.upload_files(files).await;
            let _ = tx.send(RegistryEvent::UploadFinished(result).into());
        });
        true
    }

    /// Ask the backend to delete a document. The list only changes once the
    /// follow-up refresh lands.
    pub fn remove(&mut self, id: DocumentId) {
        log::info!("Deleting document {id}");
        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = backend.delete_document(id).await;
            let _ = tx.send(RegistryEvent::DeleteFinished { id, result }.into());
        });
    }

    /// Load one document into the detail slot, leaving the list alone.
    pub fn inspect(&mut self, id: DocumentId) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = backend.fetch_document(id).await;
            let _ = tx.send(RegistryEvent::DetailLoaded { id, result }.into());
        });
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    // ── Event handling ───────────────────────────────────────────────

    pub fn handle(&mut self, event: RegistryEvent) {
        match event {
            RegistryEvent::ListLoaded { ticket, result } => self.on_list_loaded(ticket, result),
            RegistryEvent::UploadFinished(result) => self.on_upload_finished(result),
            RegistryEvent::DeleteFinished { id, result } => self.on_delete_finished(id, result),
            RegistryEvent::DetailLoaded { id, result } => self.on_detail_loaded(id, result),
        }
    }

    fn on_list_loaded(&mut self, ticket: u64, result: Result<Vec<Document>, NetworkError>) {
        self.refreshes_in_flight = self.refreshes_in_flight.saturating_sub(1);

        if ticket <= self.applied {
            log::debug!(
                "Discarding stale document list (ticket {ticket}, showing {})",
                self.applied
            );
            return;
        }

        match result {
            Ok(documents) => {
                log::debug!("Document list refreshed: {} item(s)", documents.len());
                self.documents = documents;
                self.applied = ticket;
                self.failed_delete = None;
            }
            Err(e) => {
                log::error!("Error fetching documents: {e}");
            }
        }
    }

    fn on_upload_finished(&mut self, result: Result<(), NetworkError>) {
        self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
        match result {
            Ok(()) => {
                self.refresh();
            }
            Err(e) => {
                log::error!("Error uploading file: {e}");
                let text = match e {
                    NetworkError::Status { .. } => UPLOAD_REJECTED_ALERT,
                    _ => UPLOAD_ERROR_ALERT,
                };
                self.alert = Some(text.to_string());
            }
        }
    }

    fn on_delete_finished(&mut self, id: DocumentId, result: Result<(), NetworkError>) {
        match result {
            Ok(()) => {
                if self.detail.as_ref().is_some_and(|d| d.id == id) {
                    self.detail = None;
                }
                self.refresh();
            }
            Err(e) => {
                log::warn!("Error deleting document {id}: {e}");
                self.failed_delete = Some(id);
            }
        }
    }

    fn on_detail_loaded(&mut self, id: DocumentId, result: Result<Document, NetworkError>) {
        match result {
            Ok(document) => self.detail = Some(document),
            Err(e) => {
                log::warn!("Error fetching document {id}: {e}");
                self.detail = None;
            }
        }
    }
}
