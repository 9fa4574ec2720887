//! Error types for the MoodMeter client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;

/// A shared error type for the entire MoodMeter client.
///
/// Remote failures are split into the two kinds the board reacts to
/// differently: `DataUnavailable` blocks the first render, while
/// `WriteRejected` is recovered locally by the synchronizer.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MoodError {
    /// The datastore could not serve the initial fetch
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// A create/update/delete was refused by the datastore
    #[error("Write rejected during {operation}: {message}")]
    WriteRejected {
        operation: &'static str,
        message: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A label outside the mood grid vocabulary
    #[error("Unknown mood: '{0}'")]
    InvalidMood(String),

    /// A display name that is empty after trimming
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Identity provider failure
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MoodError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a DataUnavailable error
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::DataUnavailable(message.into())
    }

    /// Creates a WriteRejected error for the given operation
    pub fn write_rejected(operation: &'static str, message: impl Into<String>) -> Self {
        Self::WriteRejected {
            operation,
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

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a DataUnavailable error
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Self::DataUnavailable(_))
    }

    /// Check if this is a WriteRejected error
    pub fn is_write_rejected(&self) -> bool {
        matches!(self, Self::WriteRejected { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MoodError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MoodError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MoodError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MoodError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at the application boundary)
impl From<anyhow::Error> for MoodError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, MoodError>`.
pub type Result<T> = std::result::Result<T, MoodError>;
