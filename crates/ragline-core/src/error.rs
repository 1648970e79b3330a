//! Error types for the Ragline client core.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the Ragline client crates.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Expected failure modes
/// (network faults, missing entities) are surfaced as `Err` values and never
/// panic past an operation boundary.
#[derive(Error, Debug, Clone, Serialize)]
pub enum RaglineError {
    /// Caller-correctable configuration problem (e.g. no model selected).
    /// Operations fail fast on this variant without issuing a transport call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport or server failure. The message carries the server-provided
    /// detail when available, or a generic fallback otherwise.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Regenerate was asked for an assistant message with no preceding user
    /// message in the log.
    #[error("No user message precedes '{id}'")]
    NoSourceMessage { id: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An operation targeted a message of the wrong role.
    #[error("Invalid target message '{id}': {reason}")]
    InvalidTarget { id: String, reason: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RaglineError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidTarget error
    pub fn invalid_target(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a NoSourceMessage error
    pub fn is_no_source_message(&self) -> bool {
        matches!(self, Self::NoSourceMessage { .. })
    }

    /// Check if this is an InvalidTarget error
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, Self::InvalidTarget { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for RaglineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Conversion from anyhow::Error, for transport implementors that surface
/// opaque client errors.
impl From<anyhow::Error> for RaglineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for RaglineError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, RaglineError>`.
pub type Result<T> = std::result::Result<T, RaglineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_helpers_produce_matching_variants() {
        assert!(RaglineError::config("no model").is_config());
        assert!(RaglineError::network("timeout").is_network());
        assert!(RaglineError::not_found("message", "m-1").is_not_found());
        assert!(
            RaglineError::invalid_target("m-1", "not a user message").is_invalid_target()
        );
    }

    #[test]
    fn anyhow_conversion_maps_to_network() {
        let err: RaglineError = anyhow::anyhow!("connection refused").into();
        assert!(err.is_network());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn display_includes_entity_information() {
        let err = RaglineError::not_found("session", "abc");
        assert_eq!(err.to_string(), "Entity not found: session 'abc'");
    }
}
