//! Error types for reservoir
//!
//! Provides granular error classification for proper retry handling:
//! - Retriable errors (driver connect failures, borrow timeouts)
//! - Non-retriable errors (configuration, validation, closed pool)

use std::fmt;
use thiserror::Error;

/// Result type for reservoir operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration errors (fatal at startup, not retriable)
    Configuration,
    /// Driver-level connect failures (retriable)
    Driver,
    /// Liveness probe failures (not retriable; the connection is discarded)
    Validation,
    /// Borrow wait exhausted (retriable with backoff)
    Timeout,
    /// Pool already closed (not retriable)
    Closed,
}

impl ErrorCategory {
    /// Whether errors in this category are generally retriable
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Driver | Self::Timeout)
    }
}

/// Main error type for reservoir
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Invalid pool configuration, detected before the pool starts
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Physical connect failed
    #[error("driver error: {message}")]
    Driver {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Liveness probe failed
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Borrow wait exhausted before a connection became available
    #[error("timeout: {message}")]
    Timeout { message: String },

    /// Operation attempted on a closed pool
    #[error("pool closed: {message}")]
    Closed { message: String },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Driver { .. } => ErrorCategory::Driver,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Closed { .. } => ErrorCategory::Closed,
        }
    }

    /// Whether this error is retriable
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
            source: None,
        }
    }

    /// Create a driver error with source
    pub fn driver_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Driver {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a closed-pool error
    pub fn closed(message: impl Into<String>) -> Self {
        Self::Closed {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Driver => write!(f, "driver"),
            Self::Validation => write!(f, "validation"),
            Self::Timeout => write!(f, "timeout"),
            Self::Closed => write!(f, "closed"),
        }
    }
}
