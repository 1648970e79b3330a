//! Core domain types for the Ragline chat client.
//!
//! This crate contains the pure domain models (messages, sessions, tasks),
//! the shared error type, and the transport trait seams. The stateful
//! components that operate on them live in `ragline-application`.

pub mod error;
pub mod message;
pub mod session;
pub mod task;
pub mod transport;

// Re-export common error type
pub use error::{RaglineError, Result};
