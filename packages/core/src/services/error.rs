//! Service Layer Error Types
//!
//! Errors raised at the persistence boundary and by the page and collection
//! services. Editing itself never fails; only persistence does.

use crate::config::ConfigError;
use crate::models::ValidationError;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The call never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response carried an error indicator; `message` is the original
    /// exception text
    #[error("Remote error ({exc_type}): {message}")]
    Remote { exc_type: String, message: String },

    /// The response decoded but reported `success: false`
    #[error("Remote call was not successful: {0}")]
    Unsuccessful(String),

    /// Page, collection or item does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// A write carried a revision older than the last applied one
    #[error("Stale write to {target}: revision {revision} is older than {current}")]
    StaleWrite {
        target: String,
        revision: u64,
        current: u64,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Item props rejected by the schema
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ServiceError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a remote error from the response's exception fields
    pub fn remote(exc_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            exc_type: exc_type.into(),
            message: message.into(),
        }
    }

    /// Create an unsuccessful-response error
    pub fn unsuccessful(endpoint: impl Into<String>) -> Self {
        Self::Unsuccessful(endpoint.into())
    }

    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a stale write error
    pub fn stale_write(target: impl Into<String>, revision: u64, current: u64) -> Self {
        Self::StaleWrite {
            target: target.into(),
            revision,
            current,
        }
    }

    pub fn is_stale_write(&self) -> bool {
        matches!(self, Self::StaleWrite { .. })
    }
}
