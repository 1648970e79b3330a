//! Session domain models.
//!
//! A session is a named, persisted conversation grouping an ordered message
//! log and the generation parameters last used in it.

use super::message::Message;
use serde::{Deserialize, Serialize};

/// Generation parameters for a chat turn.
///
/// The config last used in a session is read back when a turn is replayed
/// (edit or regenerate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier. Must be non-empty before any turn is sent.
    pub model: String,
    /// Whether retrieval augmentation is enabled.
    #[serde(default)]
    pub use_retrieval: bool,
    /// Knowledge base to retrieve from, when retrieval is enabled.
    #[serde(default)]
    pub knowledge_base: Option<String>,
    /// Reference to a stored system prompt.
    #[serde(default)]
    pub system_prompt_id: Option<String>,
}

impl GenerationConfig {
    /// Creates a config for plain generation with the given model.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

/// Summary entry for a persisted session, as shown in the session list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Server-assigned session identifier
    pub id: String,
    /// Human-readable session title, user-editable
    pub title: String,
    /// Generation parameters last used in this session
    #[serde(default)]
    pub config: GenerationConfig,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
}

/// A fully loaded session, including its message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    /// Server-assigned session identifier
    pub id: String,
    /// Human-readable session title
    pub title: String,
    /// Generation parameters last used in this session
    #[serde(default)]
    pub config: GenerationConfig,
    /// The ordered message log
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_model_sets_only_the_model() {
        let config = GenerationConfig::for_model("m1");
        assert_eq!(config.model, "m1");
        assert!(!config.use_retrieval);
        assert!(config.knowledge_base.is_none());
    }

    #[test]
    fn summary_deserializes_without_config() {
        let summary: SessionSummary = serde_json::from_str(
            r#"{"id":"s-1","title":"First chat","created_at":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(summary.config, GenerationConfig::default());
    }
}
