//! Wire and state types shared by the gateway and the controllers.
//!
//! Field names follow the backend's JSON (camelCase). Documents are
//! server-owned: the client only ever replaces them wholesale.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Server-assigned document identifier.
pub type DocumentId = i64;

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

/// One entry of the conversation thread. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// ISO-8601, as produced by the server or by the local clock.
    pub timestamp: String,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// A persisted question/answer pair from `GET /chat/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub timestamp: String,
}

impl HistoryRecord {
    /// Expand into the question message followed by the answer message.
    pub fn into_messages(self) -> [Message; 2] {
        [
            Message::new(
                format!("q-{}", self.id),
                Role::User,
                self.question,
                self.timestamp.clone(),
            ),
            Message::new(
                format!("a-{}", self.id),
                Role::Assistant,
                self.answer,
                self.timestamp,
            ),
        ]
    }
}

/// Turn a newest-first history log into a chronological message thread.
pub fn history_to_messages(history: Vec<HistoryRecord>) -> Vec<Message> {
    history
        .into_iter()
        .rev()
        .flat_map(HistoryRecord::into_messages)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "ready",
            Self::Failed => "failed",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Pending => "◷",
            Self::Processing => "⟳",
            Self::Completed => "✓",
            Self::Failed => "✗",
        }
    }

    /// Whether the server is still working on this document.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub original_name: String,
    pub file_size: u64,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

impl Document {
    /// Chunk count, only when ingestion completed.
    pub fn chunks(&self) -> Option<u32> {
        match self.status {
            DocumentStatus::Completed => self.chunk_count,
            _ => None,
        }
    }

    /// Failure reason, only when ingestion failed.
    pub fn failure(&self) -> Option<&str> {
        match self.status {
            DocumentStatus::Failed => self.error_message.as_deref(),
            _ => None,
        }
    }
}

/// Format a byte count the way the document list shows it: `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

// ============================================================================
// Uploads
// ============================================================================

/// Where an upload's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Read from disk when the request body is built.
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// One file of an upload submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub source: FileSource,
}

impl UploadFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Self {
            file_name,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// Lowercased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// MIME type guessed from the extension.
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("pdf") => "application/pdf",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("txt") => "text/plain",
            Some("md") => "text/markdown",
            _ => "application/octet-stream",
        }
    }
}
