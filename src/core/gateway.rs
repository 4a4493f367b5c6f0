//! Network gateway to the Spectron backend.
//!
//! Shapes requests and normalizes failures; holds no state and never retries.
//! Controllers talk to the [`Backend`] trait so tests can swap in a mock.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::core::models::{
    ChatReply, ChatRequest, Document, DocumentId, FileSource, HistoryRecord, UploadFile,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Cannot read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, NetworkError>;

// ============================================================================
// Backend trait
// ============================================================================

/// The outbound operations the client performs.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>>;

    async fn fetch_document(&self, id: DocumentId) -> Result<Document>;

    /// Persisted chat log, newest first.
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>>;

    async fn send_question(&self, question: String) -> Result<String>;

    /// Submit every file as its own `file` part of one multipart body.
    async fn upload_files(&self, files: Vec<UploadFile>) -> Result<()>;

    async fn delete_document(&self, id: DocumentId) -> Result<()>;
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// reqwest-backed [`Backend`].
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.base_url).map_err(|e| {
            NetworkError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut builder =
            Client::builder().connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-2xx responses to [`NetworkError::Status`].
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(NetworkError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = Self::check(response).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| NetworkError::Decode(e.to_string()))
    }

    async fn build_form(files: Vec<UploadFile>) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for file in files {
            let mime = file.content_type();
            let bytes = match file.source {
                FileSource::Bytes(bytes) => bytes,
                FileSource::Path(path) => {
                    tokio::fs::read(&path)
                        .await
                        .map_err(|source| NetworkError::File {
                            path: path.display().to_string(),
                            source,
                        })?
                }
            };
            let part = multipart::Part::bytes(bytes)
                .file_name(file.file_name)
                .mime_str(mime)?;
            form = form.part("file", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Backend for HttpGateway {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        tracing::debug!("GET /documents");
        let response = self.client.get(self.url("/documents")).send().await?;
        Self::decode(response).await
    }

    async fn fetch_document(&self, id: DocumentId) -> Result<Document> {
        tracing::debug!(id, "GET /documents/{{id}}");
        let response = self
            .client
            .get(self.url(&format!("/documents/{id}")))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>> {
        tracing::debug!("GET /chat/history");
        let response = self.client.get(self.url("/chat/history")).send().await?;
        Self::decode(response).await
    }

    async fn send_question(&self, question: String) -> Result<String> {
        tracing::debug!(len = question.len(), "POST /chat");
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&ChatRequest { question })
            .send()
            .await?;
        let reply: ChatReply = Self::decode(response).await?;
        Ok(reply.answer)
    }

    async fn upload_files(&self, files: Vec<UploadFile>) -> Result<()> {
        tracing::debug!(count = files.len(), "POST /documents/upload");
        let form = Self::build_form(files).await?;
        let response = self
            .client
            .post(self.url("/documents/upload"))
            .multipart(form)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_document(&self, id: DocumentId) -> Result<()> {
        tracing::debug!(id, "DELETE /documents/{{id}}");
        let response = self
            .client
            .delete(self.url(&format!("/documents/{id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
