use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::conversation::ConversationController;
use crate::core::events::{ClientEvent, EventSender};
use crate::core::gateway::{Backend, HttpGateway, NetworkError};
use crate::core::intake::UploadIntake;
use crate::core::registry::DocumentRegistry;

use super::events::{AppEvent, Notification, NotificationLevel};

/// Centralized handle to the client controllers.
///
/// Created once at startup and lent (`&mut`) to views while they handle
/// input. Network completions come back as [`ClientEvent`]s and are routed
/// through [`Services::apply`].
pub struct Services {
    pub conversation: ConversationController,
    pub registry: DocumentRegistry,
    pub intake: UploadIntake,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
    pub base_url: String,
}

impl Services {
    /// Build the HTTP gateway from config and wire the controllers to it.
    ///
    /// Failures here are fatal: the TUI cannot run without a backend URL.
    pub fn init(
        config: &AppConfig,
        client_tx: EventSender,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self, NetworkError> {
        let gateway = HttpGateway::new(&config.api)?;
        let base_url = gateway.base_url().to_string();
        log::info!("Backend gateway initialized for {base_url}");
        Ok(Self::with_backend(
            Arc::new(gateway),
            client_tx,
            event_tx,
            base_url,
        ))
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
        client_tx: EventSender,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        base_url: String,
    ) -> Self {
        Self {
            conversation: ConversationController::new(Arc::clone(&backend), client_tx.clone()),
            registry: DocumentRegistry::new(backend, client_tx),
            intake: UploadIntake::new(),
            event_tx,
            base_url,
        }
    }

    /// Route a network completion to the controller that owns it.
    pub fn apply(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Conversation(event) => self.conversation.handle(event),
            ClientEvent::Documents(event) => self.registry.handle(event),
        }
    }

    pub fn notify(&self, message: impl Into<String>, level: NotificationLevel) {
        let _ = self
            .event_tx
            .send(AppEvent::Notification(Notification::new(message, level)));
    }
}
