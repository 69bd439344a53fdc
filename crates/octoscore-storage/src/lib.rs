//! Store abstraction layer for the OctoScore server.
//!
//! Defines the [`ScoreStore`] trait with its two operation classes
//! (authoritative vs. best-effort cache) and the store error types. Concrete
//! backends live in their own crates.

pub mod error;
pub mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::ScoreStore;
