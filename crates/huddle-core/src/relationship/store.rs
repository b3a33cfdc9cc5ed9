//! Relationship store trait.
//!
//! Defines the interface to the external backing store that owns the
//! relationship records and user profiles.

use async_trait::async_trait;

use crate::error::Result;
use super::model::{Friend, PendingRequest, RelationshipRecord, UserProfile};

/// An abstract interface to the external relationship store.
///
/// This trait defines the bulk-read and mutate operations the
/// synchronization subsystem issues, decoupling it from the concrete
/// backend (e.g. a hosted document store or a test double). The store is
/// also the origin of the push-event feed, but that feed is consumed
/// through a separate transport collaborator.
///
/// # Implementation Notes
///
/// Implementations should apply the server-side scoping themselves: the
/// fetch operations are already per-user, and duplicate-relationship
/// enforcement on top of these primitives is done by the caller.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Fetches the full accepted-friend list for a user.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Friend>)`: all accepted friends with display fields
    /// - `Err(_)`: store unavailable or query failed
    async fn fetch_friends(&self, user_id: &str) -> Result<Vec<Friend>>;

    /// Fetches the inbound pending requests for a user, oldest first.
    async fn fetch_pending_requests(&self, user_id: &str) -> Result<Vec<PendingRequest>>;

    /// Finds a relationship record between two users, in either direction
    /// and in any status.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: a record exists between the two users
    /// - `Ok(None)`: no record in either direction
    /// - `Err(_)`: store unavailable or query failed
    async fn find_record_between(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<Option<RelationshipRecord>>;

    /// Inserts a new pending relationship record.
    async fn insert_request(
        &self,
        requester_id: &str,
        recipient_id: &str,
    ) -> Result<RelationshipRecord>;

    /// Marks the given record as accepted.
    async fn accept_request(&self, record_id: &str) -> Result<()>;

    /// Deletes the given record (decline or friend removal).
    async fn delete_record(&self, record_id: &str) -> Result<()>;

    /// Fetches a user profile by id.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Fetches a user profile by exact display name.
    async fn find_profile_by_display_name(&self, display_name: &str)
        -> Result<Option<UserProfile>>;

    /// Searches user profiles by display-name prefix or substring,
    /// implementation defined. Exclusion of the caller's existing
    /// relationships is done by the caller.
    async fn search_profiles(&self, query: &str) -> Result<Vec<UserProfile>>;
}
