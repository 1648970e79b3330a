//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation
//! log, including roles, attachments and retrieval excerpts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A file reference carried by a message.
///
/// Attachments are set once when the owning message is created and are
/// immutable afterwards, except by full message replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique attachment identifier (UUID format)
    pub id: String,
    /// Original file name
    pub name: String,
    /// MIME type of the file
    pub mime_type: String,
    /// Size of the file in bytes
    pub size: u64,
    /// Retrievable URL, when the server has stored the file
    pub url: Option<String>,
}

/// A retrieval-result excerpt attached to an assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedDocument {
    /// Name of the source document
    pub source: String,
    /// The matched excerpt text
    pub excerpt: String,
    /// Relevance score reported by the retriever, if any
    pub score: Option<f64>,
}

/// A single message in a conversation log.
///
/// Messages carry a client-generated id until the server confirms the
/// exchange they belong to; confirmed messages are never re-identified.
/// Log order is append-only insertion order: a message's position never
/// changes after insertion, except for edit truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier. Temporary ids use a `temp-` prefix.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Supplementary reasoning text (assistant messages only). Lives an
    /// independent lifecycle from `content`.
    #[serde(default)]
    pub thinking_process: Option<String>,
    /// File references attached at creation time.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Retrieval excerpts backing this turn, set once on reconciliation.
    #[serde(default)]
    pub related_documents: Vec<RelatedDocument>,
    /// Marks a failed send. The message stays visible in the log.
    #[serde(default)]
    pub error: bool,
    /// Timestamp when the message was created (ISO 8601 format).
    pub created_at: String,
}

impl Message {
    /// Creates a temporary user message for optimistic display.
    ///
    /// The id is client-generated (`temp-user-` prefix) so the message can
    /// be located again when the server response arrives.
    pub fn temp_user(content: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: format!("temp-user-{}", Uuid::new_v4()),
            role: MessageRole::User,
            content: content.into(),
            thinking_process: None,
            attachments,
            related_documents: Vec::new(),
            error: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates an assistant message from server-provided content.
    pub fn assistant(content: impl Into<String>, thinking_process: Option<String>) -> Self {
        Self {
            id: format!("assistant-{}", Uuid::new_v4()),
            role: MessageRole::Assistant,
            content: content.into(),
            thinking_process,
            attachments: Vec::new(),
            related_documents: Vec::new(),
            error: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// True if this message was sent by the user.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// True if this message was produced by the assistant.
    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}
