//! Error types for the huddle client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the huddle synchronization subsystem.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum HuddleError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A relationship record already exists between the two users,
    /// in either direction and in any status
    #[error("A relationship between '{user_id}' and '{other_user_id}' already exists")]
    DuplicateRelationship {
        user_id: String,
        other_user_id: String,
    },

    /// The request is not valid as issued (e.g. self-friending)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backing relationship store error (bulk reads and mutations)
    #[error("Store error: {0}")]
    Store(String),

    /// Authentication/credential error
    #[error("Auth error: {0}")]
    Auth(String),

    /// Live-update channel error (connect, authorize, mid-stream)
    #[error("Channel error: {0}")]
    Channel(String),

    /// A push payload that does not match the expected event shape
    #[error("Malformed change event: {reason}")]
    MalformedEvent { reason: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// IO error
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HuddleError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a DuplicateRelationship error
    pub fn duplicate_relationship(
        user_id: impl Into<String>,
        other_user_id: impl Into<String>,
    ) -> Self {
        Self::DuplicateRelationship {
            user_id: user_id.into(),
            other_user_id: other_user_id.into(),
        }
    }

    /// Creates an InvalidRequest error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Creates a Store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a Channel error
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    /// Creates a MalformedEvent error
    pub fn malformed_event(reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            reason: reason.into(),
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

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a DuplicateRelationship error
    pub fn is_duplicate_relationship(&self) -> bool {
        matches!(self, Self::DuplicateRelationship { .. })
    }

    /// Check if this is a Channel error
    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }

    /// Check if this is a MalformedEvent error
    pub fn is_malformed_event(&self) -> bool {
        matches!(self, Self::MalformedEvent { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HuddleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for HuddleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HuddleError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error for collaborator implementations that
/// report opaque errors
impl From<anyhow::Error> for HuddleError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for HuddleError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, HuddleError>`.
pub type Result<T> = std::result::Result<T, HuddleError>;
