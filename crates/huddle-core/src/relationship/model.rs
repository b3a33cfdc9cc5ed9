//! Relationship domain models.
//!
//! This module contains the entities the synchronization subsystem projects
//! locally: accepted friends, inbound pending requests, and the external
//! store's relationship record they are derived from.

use serde::{Deserialize, Serialize};

/// Status of a relationship record in the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RelationshipStatus {
    /// Requested but not yet decided by the recipient
    Pending,
    /// Confirmed by the recipient
    Accepted,
}

/// An accepted bidirectional relationship, as displayed to the user.
///
/// Carries the counterparty's denormalized display fields (name, weekly
/// counter, streak). At most one entry exists per counterparty id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    /// Opaque user identifier of the counterparty
    pub id: String,
    /// Display name of the counterparty
    pub display_name: String,
    /// The counterparty's counter value for the current week
    pub weekly_count: u32,
    /// The counterparty's current streak in days
    pub streak_days: u32,
}

/// Denormalized requester info attached to a pending request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSummary {
    /// Opaque user identifier of the requester
    pub id: String,
    /// Display name of the requester
    pub display_name: String,
}

/// An inbound, not-yet-decided friend request where the current user is
/// the recipient.
///
/// `id` is the relationship-record identifier, distinct from any user id.
/// At most one entry exists per record id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Identifier of the underlying relationship record
    pub id: String,
    /// The requesting user
    pub from: PeerSummary,
    /// Always `Pending` while the request is displayed
    pub status: RelationshipStatus,
}

/// The directed request/accept record owned by the backing store.
///
/// The client never mutates this directly; its lifecycle (insert on
/// request, update on accept, delete on decline/remove) is the source of
/// the change events the reconciler consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Unique record identifier
    pub id: String,
    /// The user who sent the request
    pub requester_id: String,
    /// The user who received the request
    pub recipient_id: String,
    /// Current status of the relationship
    pub status: RelationshipStatus,
    /// Timestamp of the last store-side update (ISO 8601 format)
    pub updated_at: String,
}

impl RelationshipRecord {
    /// Returns true if the given user is the requester or the recipient.
    pub fn involves(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.recipient_id == user_id
    }
}

/// A user profile row from the backing store, used for search results and
/// display-name enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque user identifier
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Counter value for the current week
    #[serde(default)]
    pub weekly_count: u32,
    /// Current streak in days
    #[serde(default)]
    pub streak_days: u32,
}

impl From<UserProfile> for Friend {
    fn from(profile: UserProfile) -> Self {
        Friend {
            id: profile.id,
            display_name: profile.display_name,
            weekly_count: profile.weekly_count,
            streak_days: profile.streak_days,
        }
    }
}

impl From<&UserProfile> for PeerSummary {
    fn from(profile: &UserProfile) -> Self {
        PeerSummary {
            id: profile.id.clone(),
            display_name: profile.display_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_involves_both_parties() {
        let record = RelationshipRecord {
            id: "r1".to_string(),
            requester_id: "u1".to_string(),
            recipient_id: "u2".to_string(),
            status: RelationshipStatus::Pending,
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };

        assert!(record.involves("u1"));
        assert!(record.involves("u2"));
        assert!(!record.involves("u3"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RelationshipStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(RelationshipStatus::Accepted.to_string(), "accepted");
    }
}
