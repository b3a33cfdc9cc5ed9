//! Boundary parsing of push-feed payloads.
//!
//! Incoming payloads are parsed into a closed tagged union at the channel
//! boundary. Anything that does not match the expected shape is rejected
//! with a typed error for the caller to log and drop, so an untyped
//! payload never reaches the reconciler.

use serde::{Deserialize, Serialize};

use crate::error::{HuddleError, Result};
use crate::relationship::model::RelationshipStatus;

/// The store-side operation a change event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeOperation {
    Insert,
    Update,
    Delete,
}

/// The relationship-record fields carried by a change event.
///
/// Only the record id is guaranteed; delete events may arrive with
/// nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    /// Relationship-record identifier
    pub id: String,
    /// The user who sent the request, when present
    #[serde(default)]
    pub requester_id: Option<String>,
    /// The user who received the request, when present
    #[serde(default)]
    pub recipient_id: Option<String>,
    /// The record status after the operation, when present
    #[serde(default)]
    pub status: Option<RelationshipStatus>,
}

/// One change event from the push feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// What the store did to the record
    pub operation: ChangeOperation,
    /// The record payload as delivered
    pub record: RecordPayload,
}

impl ChangeEvent {
    /// Parses a raw push payload into a [`ChangeEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`HuddleError::MalformedEvent`] when the payload does not
    /// match the expected shape or carries an empty record id.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let event: ChangeEvent = serde_json::from_value(value)
            .map_err(|err| HuddleError::malformed_event(err.to_string()))?;

        if event.record.id.is_empty() {
            return Err(HuddleError::malformed_event("record id is empty"));
        }

        Ok(event)
    }
}
