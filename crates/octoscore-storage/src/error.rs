//! Store error types.
//!
//! Only authoritative operations surface these errors to callers; the cache
//! operation class degrades to "no value" instead. A cache miss is never an
//! error.

use std::fmt;

/// Errors that can occur on authoritative store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No usable connection exists after the bounded reconnect attempts.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of why no connection is available.
        message: String,
    },

    /// The key does not exist in the store.
    #[error("key not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// The remote side answered with an error or an unreadable frame.
    #[error("store protocol error: {message}")]
    Protocol {
        /// Description of the protocol failure.
        message: String,
    },

    /// An I/O error on the store connection.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a new `Protocol` error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Returns `true` if this is an unavailability error.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unavailable { .. } => ErrorCategory::Unavailable,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Protocol { .. } => ErrorCategory::Protocol,
            Self::Io(_) => ErrorCategory::Io,
        }
    }
}

/// Categories of store errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Unavailable,
    NotFound,
    Protocol,
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::NotFound => write!(f, "not_found"),
            Self::Protocol => write!(f, "protocol"),
            Self::Io => write!(f, "io"),
        }
    }
}
