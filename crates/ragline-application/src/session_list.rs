//! Session list cache.
//!
//! In-memory summary list of past sessions. The cache is synchronized from
//! three sources: explicit refresh, the conversation store's post-send
//! refresh (when a session transitions from unsaved to saved), and local
//! rename/delete edits applied ahead of server confirmation.

use ragline_core::error::Result;
use ragline_core::session::{GenerationConfig, SessionSummary};
use ragline_core::transport::ChatTransport;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory cache of session summaries.
pub struct SessionListCache {
    /// Cached summary entries, newest ordering as returned by the server
    entries: RwLock<Vec<SessionSummary>>,
    /// Transport used for list refreshes
    transport: Arc<dyn ChatTransport>,
}

impl SessionListCache {
    /// Creates an empty cache over the given transport.
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            transport,
        }
    }

    /// Replaces the cached list with a fresh fetch from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the list fetch fails; the previous cache content
    /// is kept in that case.
    pub async fn refresh(&self) -> Result<()> {
        let list = self.transport.list_sessions().await?;
        tracing::debug!(count = list.len(), "session list refreshed");
        let mut entries = self.entries.write().await;
        *entries = list;
        Ok(())
    }

    /// Returns a snapshot of all cached summaries.
    pub async fn all(&self) -> Vec<SessionSummary> {
        self.entries.read().await.clone()
    }

    /// Looks up one cached summary by session id.
    pub async fn get(&self, session_id: &str) -> Option<SessionSummary> {
        let entries = self.entries.read().await;
        entries.iter().find(|s| s.id == session_id).cloned()
    }

    /// Returns the last-used generation config recorded for a session.
    pub async fn config_for(&self, session_id: &str) -> Option<GenerationConfig> {
        self.get(session_id).await.map(|s| s.config)
    }

    /// Applies a title change locally, ahead of server confirmation.
    ///
    /// Returns `false` when the session is not cached.
    pub async fn rename_local(&self, session_id: &str, title: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|s| s.id == session_id) {
            Some(entry) => {
                entry.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Removes a session from the cache.
    ///
    /// Returns `false` when the session was not cached.
    pub async fn remove(&self, session_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|s| s.id != session_id);
        entries.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragline_core::error::RaglineError;
    use ragline_core::session::SessionDetail;
    use ragline_core::transport::{ReplayOutcome, ReplayRequest, SendTurnRequest, TurnOutcome};
    use std::sync::Mutex;

    /// Transport double that only serves the session list endpoints.
    struct ListOnlyTransport {
        sessions: Mutex<Vec<SessionSummary>>,
        fail_listing: Mutex<bool>,
    }

    impl ListOnlyTransport {
        fn new(sessions: Vec<SessionSummary>) -> Self {
            Self {
                sessions: Mutex::new(sessions),
                fail_listing: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for ListOnlyTransport {
        async fn send_turn(&self, _request: SendTurnRequest) -> Result<TurnOutcome> {
            unimplemented!("not used by session list tests")
        }

        async fn send_turn_simple(&self, _request: ReplayRequest) -> Result<ReplayOutcome> {
            unimplemented!("not used by session list tests")
        }

        async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
            if *self.fail_listing.lock().unwrap() {
                return Err(RaglineError::network("list failed"));
            }
            Ok(self.sessions.lock().unwrap().clone())
        }

        async fn get_session(&self, session_id: &str) -> Result<SessionDetail> {
            Err(RaglineError::not_found("session", session_id))
        }

        async fn rename_session(&self, _session_id: &str, _title: &str) -> Result<()> {
            Ok(())
        }

        async fn delete_session(&self, _session_id: &str) -> Result<()> {
            Ok(())
        }
    }

    fn summary(id: &str, title: &str) -> SessionSummary {
        SessionSummary {
            id: id.to_string(),
            title: title.to_string(),
            config: GenerationConfig::for_model("m1"),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn refresh_replaces_cached_entries() {
        let transport = Arc::new(ListOnlyTransport::new(vec![
            summary("s-1", "First"),
            summary("s-2", "Second"),
        ]));
        let cache = SessionListCache::new(transport);

        assert!(cache.all().await.is_empty());
        cache.refresh().await.unwrap();

        assert_eq!(cache.all().await.len(), 2);
        assert_eq!(cache.get("s-2").await.unwrap().title, "Second");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_content() {
        let transport = Arc::new(ListOnlyTransport::new(vec![summary("s-1", "First")]));
        let cache = SessionListCache::new(transport.clone());
        cache.refresh().await.unwrap();

        *transport.fail_listing.lock().unwrap() = true;
        assert!(cache.refresh().await.is_err());
        assert_eq!(cache.all().await.len(), 1);
    }

    #[tokio::test]
    async fn rename_local_is_applied_ahead_of_confirmation() {
        let transport = Arc::new(ListOnlyTransport::new(vec![summary("s-1", "First")]));
        let cache = SessionListCache::new(transport);
        cache.refresh().await.unwrap();

        assert!(cache.rename_local("s-1", "Renamed").await);
        assert_eq!(cache.get("s-1").await.unwrap().title, "Renamed");
        assert!(!cache.rename_local("missing", "x").await);
    }

    #[tokio::test]
    async fn remove_drops_only_the_given_session() {
        let transport = Arc::new(ListOnlyTransport::new(vec![
            summary("s-1", "First"),
            summary("s-2", "Second"),
        ]));
        let cache = SessionListCache::new(transport);
        cache.refresh().await.unwrap();

        assert!(cache.remove("s-1").await);
        assert!(!cache.remove("s-1").await);
        assert_eq!(cache.all().await.len(), 1);
        assert!(cache.get("s-2").await.is_some());
    }

    #[tokio::test]
    async fn config_for_returns_last_used_config() {
        let transport = Arc::new(ListOnlyTransport::new(vec![summary("s-1", "First")]));
        let cache = SessionListCache::new(transport);
        cache.refresh().await.unwrap();

        let config = cache.config_for("s-1").await.unwrap();
        assert_eq!(config.model, "m1");
        assert!(cache.config_for("missing").await.is_none());
    }
}
