//! Conversation store.
//!
//! Owns the ordered message log for the active chat session under
//! optimistic-update semantics: send, edit and regenerate mutate the local
//! log before the server confirms, then reconcile on the response. All
//! mutation funnels through the operations defined here; there are no ad hoc
//! field writes, which keeps the interleaving behavior analyzable.

use crate::session_list::SessionListCache;
use ragline_core::error::{RaglineError, Result};
use ragline_core::message::{Message, MessageRole};
use ragline_core::session::GenerationConfig;
use ragline_core::transport::{
    ChatTransport, FileUpload, ReplayOutcome, ReplayRequest, SendTurnRequest, TurnOutcome,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Transient content shown in place of an assistant reply while it is being
/// regenerated. Stays visible if the replay fails.
pub const REGENERATING_PLACEHOLDER: &str = "Regenerating response...";

/// Mutable store state, owned exclusively by the store and guarded by one
/// lock so each reconciliation step is applied atomically.
#[derive(Default)]
struct ConversationState {
    /// Active session id; `None` for an unsaved, in-progress session
    session_id: Option<String>,
    /// The ordered message log
    log: Vec<Message>,
    /// Number of operations currently awaiting a transport response
    pending: u32,
    /// Message of the most recent expected failure, if any
    last_error: Option<String>,
    /// Generation config of the most recent successful turn, read back for
    /// edit/regenerate replay
    last_config: Option<GenerationConfig>,
}

/// The client-side conversation state synchronizer.
///
/// `ConversationStore` is responsible for:
/// - Appending user turns optimistically and reconciling server replies
/// - Replaying generation for edited or regenerated messages
/// - Adopting the server-issued session id on first successful send
/// - Keeping the session list cache in step with rename/delete
///
/// Overlapping operations are neither queued nor deduplicated; callers are
/// expected to gate on [`ConversationStore::is_busy`]. Expected failures
/// (network, missing entities) come back as `Err` values and are mirrored
/// into [`ConversationStore::last_error`]; nothing panics past the store
/// boundary.
pub struct ConversationStore {
    state: RwLock<ConversationState>,
    transport: Arc<dyn ChatTransport>,
    session_list: Arc<SessionListCache>,
}

impl ConversationStore {
    /// Creates a store over the given transport and session list cache.
    pub fn new(transport: Arc<dyn ChatTransport>, session_list: Arc<SessionListCache>) -> Self {
        Self {
            state: RwLock::new(ConversationState::default()),
            transport,
            session_list,
        }
    }

    // ============================================================================
    // Read accessors
    // ============================================================================

    /// Returns a snapshot of the message log.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.log.clone()
    }

    /// Returns the active session id, if the session has been saved.
    pub async fn session_id(&self) -> Option<String> {
        self.state.read().await.session_id.clone()
    }

    /// True while at least one operation awaits a transport response.
    pub async fn is_busy(&self) -> bool {
        self.state.read().await.pending > 0
    }

    /// Returns the message of the most recent expected failure.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    // ============================================================================
    // Operations
    // ============================================================================

    /// Sends a user turn, optionally with file payloads.
    ///
    /// The user message appears in the log immediately with a temporary id.
    /// On success the temporary message is finalized in place (retrieval
    /// excerpts installed), the assistant reply is appended, and the
    /// server-issued session id is adopted if the session was unsaved. On
    /// failure the message stays, flagged with `error`; the caller owns the
    /// retry affordance (restoring text and files to the input surface).
    ///
    /// # Errors
    ///
    /// - `Config` when the model is empty, or text and files are both empty;
    ///   no transport call is issued
    /// - `Network` when the transport call fails
    pub async fn send(
        &self,
        text: &str,
        config: GenerationConfig,
        files: Vec<FileUpload>,
    ) -> Result<TurnOutcome> {
        if config.model.is_empty() {
            return Err(RaglineError::config("no model selected"));
        }
        if text.is_empty() && files.is_empty() {
            return Err(RaglineError::config(
                "message text and attachments are both empty",
            ));
        }

        let attachments = files.iter().map(FileUpload::as_attachment).collect();
        let (temp_id, session_id) = {
            let mut state = self.state.write().await;
            let message = Message::temp_user(text, attachments);
            let temp_id = message.id.clone();
            state.log.push(message);
            state.pending += 1;
            state.last_error = None;
            (temp_id, state.session_id.clone())
        };
        tracing::debug!(session_id = ?session_id, "sending turn");

        let request = SendTurnRequest {
            session_id,
            text: text.to_string(),
            config: config.clone(),
            files,
        };
        match self.transport.send_turn(request).await {
            Ok(outcome) => {
                // Single atomic reconciliation step: finalize the temporary
                // user message, append the assistant reply, adopt the session
                // id. Position of the user message is unchanged.
                let was_unsaved = {
                    let mut state = self.state.write().await;
                    if let Some(user) = state.log.iter_mut().find(|m| m.id == temp_id) {
                        user.related_documents = outcome.related_documents.clone();
                    }
                    state.log.push(Message::assistant(
                        &outcome.assistant_text,
                        outcome.thinking_process.clone(),
                    ));
                    let was_unsaved = state.session_id.is_none();
                    state.session_id = Some(outcome.session_id.clone());
                    state.last_config = Some(config);
                    state.pending = state.pending.saturating_sub(1);
                    was_unsaved
                };
                if was_unsaved {
                    // The session just came into existence server-side.
                    if let Err(err) = self.session_list.refresh().await {
                        tracing::warn!(error = %err, "session list refresh after first send failed");
                    }
                }
                Ok(outcome)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                if let Some(user) = state.log.iter_mut().find(|m| m.id == temp_id) {
                    user.error = true;
                }
                state.pending = state.pending.saturating_sub(1);
                state.last_error = Some(err.to_string());
                tracing::warn!(error = %err, "send failed; user message kept with error flag");
                Err(err)
            }
        }
    }

    /// Edits a user message and regenerates the reply from that point.
    ///
    /// The log is truncated to end at the edited message before the replay
    /// is issued; everything after it, including prior assistant replies,
    /// is discarded. The truncation is committed and is not rolled back
    /// when the replay fails - the edited message then stands with no
    /// assistant follow-up.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no message has the given id
    /// - `InvalidTarget` when the target is not a user message
    /// - `Config` when no generation config is known for replay
    /// - `Network` when the replay call fails
    pub async fn edit(&self, message_id: &str, new_content: &str) -> Result<ReplayOutcome> {
        let config = self.replay_config().await?;
        let session_id = {
            let mut state = self.state.write().await;
            let index = state
                .log
                .iter()
                .position(|m| m.id == message_id)
                .ok_or_else(|| RaglineError::not_found("message", message_id))?;
            if state.log[index].role != MessageRole::User {
                return Err(RaglineError::invalid_target(
                    message_id,
                    "only user messages can be edited",
                ));
            }
            // Destructive truncation, committed before the remote call.
            state.log.truncate(index + 1);
            state.log[index].content = new_content.to_string();
            state.pending += 1;
            state.last_error = None;
            state.session_id.clone()
        };
        tracing::debug!(message_id, "editing message and replaying");

        let request = ReplayRequest {
            session_id,
            text: new_content.to_string(),
            config,
        };
        match self.transport.send_turn_simple(request).await {
            Ok(outcome) => {
                let mut state = self.state.write().await;
                state.log.push(Message::assistant(
                    &outcome.assistant_text,
                    outcome.thinking_process.clone(),
                ));
                state.pending = state.pending.saturating_sub(1);
                Ok(outcome)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.pending = state.pending.saturating_sub(1);
                state.last_error = Some(err.to_string());
                tracing::warn!(error = %err, "replay after edit failed; truncation stands");
                Err(err)
            }
        }
    }

    /// Regenerates an assistant reply in place.
    ///
    /// The source text is the nearest preceding user message in the log;
    /// the log itself is the single source of truth for message order.
    /// While the replay is in flight the target shows
    /// [`REGENERATING_PLACEHOLDER`]; on failure the placeholder stays (no
    /// automatic revert on this path). The log length never changes.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no message has the given id
    /// - `InvalidTarget` when the target is not an assistant message
    /// - `NoSourceMessage` when no user message precedes the target
    /// - `Config` when no generation config is known for replay
    /// - `Network` when the replay call fails
    pub async fn regenerate(&self, message_id: &str) -> Result<ReplayOutcome> {
        let config = self.replay_config().await?;
        let (session_id, source_text) = {
            let mut state = self.state.write().await;
            let index = state
                .log
                .iter()
                .position(|m| m.id == message_id)
                .ok_or_else(|| RaglineError::not_found("message", message_id))?;
            if state.log[index].role != MessageRole::Assistant {
                return Err(RaglineError::invalid_target(
                    message_id,
                    "only assistant messages can be regenerated",
                ));
            }
            let source_text = state.log[..index]
                .iter()
                .rev()
                .find(|m| m.role == MessageRole::User)
                .map(|m| m.content.clone())
                .ok_or_else(|| RaglineError::NoSourceMessage {
                    id: message_id.to_string(),
                })?;
            let target = &mut state.log[index];
            target.content = REGENERATING_PLACEHOLDER.to_string();
            target.thinking_process = None;
            state.pending += 1;
            state.last_error = None;
            (state.session_id.clone(), source_text)
        };
        tracing::debug!(message_id, "regenerating assistant reply");

        let request = ReplayRequest {
            session_id,
            text: source_text,
            config,
        };
        match self.transport.send_turn_simple(request).await {
            Ok(outcome) => {
                let mut state = self.state.write().await;
                if let Some(target) = state.log.iter_mut().find(|m| m.id == message_id) {
                    target.content = outcome.assistant_text.clone();
                    target.thinking_process = outcome.thinking_process.clone();
                }
                state.pending = state.pending.saturating_sub(1);
                Ok(outcome)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.pending = state.pending.saturating_sub(1);
                state.last_error = Some(err.to_string());
                tracing::warn!(error = %err, "regenerate failed; placeholder left in place");
                Err(err)
            }
        }
    }

    /// Renames a session, updating the cached title ahead of confirmation.
    ///
    /// There is no optimistic rollback: when the server call fails the
    /// optimistic title stays until the caller refreshes the list.
    pub async fn rename(&self, session_id: &str, new_title: &str) -> Result<()> {
        self.session_list.rename_local(session_id, new_title).await;
        match self.transport.rename_session(session_id, new_title).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let mut state = self.state.write().await;
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Deletes a session after server confirmation.
    ///
    /// When the deleted session is the active one, the store resets to a
    /// fresh unsaved session.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        match self.transport.delete_session(session_id).await {
            Ok(()) => {
                self.session_list.remove(session_id).await;
                let mut state = self.state.write().await;
                if state.session_id.as_deref() == Some(session_id) {
                    *state = ConversationState::default();
                }
                Ok(())
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Clears the active session unconditionally.
    ///
    /// Idempotent and infallible: the store ends with no session id and an
    /// empty log either way.
    pub async fn start_new_session(&self) {
        let mut state = self.state.write().await;
        *state = ConversationState::default();
    }

    /// Loads a persisted session into the store.
    ///
    /// Installs the session's log and last-used generation config, making
    /// edit/regenerate replay available immediately.
    pub async fn load_session(&self, session_id: &str) -> Result<()> {
        match self.transport.get_session(session_id).await {
            Ok(detail) => {
                let mut state = self.state.write().await;
                state.session_id = Some(detail.id);
                state.log = detail.messages;
                state.last_config = Some(detail.config);
                state.last_error = None;
                Ok(())
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Resolves the config used for replay: the last successful turn's
    /// config, falling back to the session list cache entry.
    async fn replay_config(&self) -> Result<GenerationConfig> {
        let (config, session_id) = {
            let state = self.state.read().await;
            (state.last_config.clone(), state.session_id.clone())
        };
        if let Some(config) = config {
            return Ok(config);
        }
        if let Some(id) = session_id {
            if let Some(config) = self.session_list.config_for(&id).await {
                return Ok(config);
            }
        }
        Err(RaglineError::config(
            "no generation config recorded for replay",
        ))
    }
}
