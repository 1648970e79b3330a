//! Application layer for the Ragline chat client.
//!
//! This crate provides the stateful components that coordinate the domain
//! models with a transport implementation: the conversation store, the
//! session list cache and the ingestion progress tracker.

pub mod conversation;
pub mod progress;
pub mod session_list;

pub use conversation::{ConversationStore, REGENERATING_PLACEHOLDER};
pub use progress::ProgressTracker;
pub use session_list::SessionListCache;
