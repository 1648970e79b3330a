//! Transport trait seams.
//!
//! Defines the request/response interfaces the stateful components consume,
//! decoupling them from the concrete wire client (HTTP, test double, etc.).
//! The traits deliberately expose shapes only; no wire format is implied.

use crate::error::Result;
use crate::message::{Attachment, RelatedDocument};
use crate::session::{GenerationConfig, SessionDetail, SessionSummary};
use crate::task::TaskProgress;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw file payload carried alongside a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original file name
    pub name: String,
    /// MIME type of the file
    pub mime_type: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Projects this upload into the attachment reference stored on the
    /// optimistic user message.
    pub fn as_attachment(&self) -> Attachment {
        Attachment {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.bytes.len() as u64,
            url: None,
        }
    }
}

/// A full chat turn request, including file payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTurnRequest {
    /// Session to append to; `None` for an unsaved session.
    pub session_id: Option<String>,
    /// The user's message text.
    pub text: String,
    /// Generation parameters for this turn.
    pub config: GenerationConfig,
    /// Raw file payloads to upload with the turn.
    pub files: Vec<FileUpload>,
}

/// The server's answer to a full chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// The session the turn was recorded under. For a previously unsaved
    /// session this is the newly assigned id.
    pub session_id: String,
    /// The assistant's reply text.
    pub assistant_text: String,
    /// Supplementary reasoning text, when the model produced one.
    #[serde(default)]
    pub thinking_process: Option<String>,
    /// Retrieval excerpts that backed the reply.
    #[serde(default)]
    pub related_documents: Vec<RelatedDocument>,
}

/// A no-attachment replay request, used by edit and regenerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRequest {
    /// Session the replayed turn belongs to.
    pub session_id: Option<String>,
    /// The user text to replay generation for.
    pub text: String,
    /// Generation parameters, taken from the session's last known config.
    pub config: GenerationConfig,
}

/// The server's answer to a replay request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    /// The assistant's reply text.
    pub assistant_text: String,
    /// Supplementary reasoning text, when the model produced one.
    #[serde(default)]
    pub thinking_process: Option<String>,
}

/// An abstract client for the chat endpoints.
///
/// This trait defines the contract the conversation store and session list
/// depend on, decoupling them from the specific transport mechanism
/// (e.g., HTTP client, in-memory test double).
///
/// # Implementation Notes
///
/// Implementations should surface server-provided error detail through
/// `RaglineError::Network` so it can be shown to the operator.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a chat turn, optionally carrying file payloads.
    ///
    /// # Returns
    ///
    /// - `Ok(TurnOutcome)`: The turn was recorded and answered
    /// - `Err(_)`: Transport or server failure
    async fn send_turn(&self, request: SendTurnRequest) -> Result<TurnOutcome>;

    /// Replays generation for existing user text, without attachments.
    ///
    /// # Returns
    ///
    /// - `Ok(ReplayOutcome)`: A fresh assistant reply
    /// - `Err(_)`: Transport or server failure
    async fn send_turn_simple(&self, request: ReplayRequest) -> Result<ReplayOutcome>;

    /// Lists all persisted sessions.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

    /// Fetches one session including its message log.
    ///
    /// # Returns
    ///
    /// - `Ok(SessionDetail)`: Session found
    /// - `Err(_)`: Session missing or transport failure
    async fn get_session(&self, session_id: &str) -> Result<SessionDetail>;

    /// Renames a persisted session.
    async fn rename_session(&self, session_id: &str, title: &str) -> Result<()>;

    /// Deletes a persisted session.
    async fn delete_session(&self, session_id: &str) -> Result<()>;
}

/// An abstract client for the knowledge-base processing endpoints.
#[async_trait]
pub trait KnowledgeTransport: Send + Sync {
    /// Requests ingestion of a knowledge base under a client-generated
    /// task id.
    ///
    /// # Arguments
    ///
    /// * `knowledge_base_id` - The knowledge base to process
    /// * `force` - Rebuild even when an index already exists
    /// * `task_id` - Client-generated task identifier
    async fn request_processing(
        &self,
        knowledge_base_id: &str,
        force: bool,
        task_id: &str,
    ) -> Result<()>;

    /// Polls the current status of an ingestion task.
    async fn poll_progress(
        &self,
        knowledge_base_id: &str,
        task_id: &str,
    ) -> Result<TaskProgress>;

    /// Asks the server to cancel an ingestion task.
    ///
    /// A failure here must not block local cancellation; callers record the
    /// cancelled state regardless of the outcome.
    async fn cancel_processing(&self, knowledge_base_id: &str, task_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_projects_to_attachment_with_size() {
        let upload = FileUpload {
            name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: b"hello world".to_vec(),
        };

        let attachment = upload.as_attachment();
        assert_eq!(attachment.name, "notes.txt");
        assert_eq!(attachment.size, 11);
        assert!(attachment.url.is_none());
    }
}
