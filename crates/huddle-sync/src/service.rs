//! Relationship query service.
//!
//! On-demand bulk reads and mutations against the external store: cold
//! hydration, friend requests, accept/decline, removal and user search.
//! Mutating calls enforce the undirected-for-existence rule: at most
//! one relationship record between two users, in either direction and
//! any status.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use huddle_core::error::{HuddleError, Result};
use huddle_core::relationship::{RelationshipRecord, RelationshipStore, UserProfile};

use crate::state::SharedRelationshipState;

/// The recipient's decision on an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestResponse {
    Accept,
    Decline,
}

/// Issues commands and bulk reads against the relationship store.
///
/// Shares cache-write privileges with the event applier: hydration
/// replaces both collections, and locally-originated removals are
/// applied immediately so the later feed echo is a no-op.
pub struct RelationshipService {
    store: Arc<dyn RelationshipStore>,
    state: SharedRelationshipState,
}

impl RelationshipService {
    pub fn new(store: Arc<dyn RelationshipStore>, state: SharedRelationshipState) -> Self {
        Self { store, state }
    }

    /// Bulk-fetches both collections and replaces the cache atomically.
    ///
    /// Used for cold-start hydration and as the reconciliation fallback.
    /// On failure the cache keeps its prior contents.
    pub async fn hydrate(&self, user_id: &str) -> Result<()> {
        let friends = self.store.fetch_friends(user_id).await?;
        let pending = self.store.fetch_pending_requests(user_id).await?;
        debug!(
            "[RelationshipService] hydrated {} friends, {} pending requests",
            friends.len(),
            pending.len()
        );
        self.state.replace_all(friends, pending);
        Ok(())
    }

    /// Sends a friend request to the user with the given display name.
    ///
    /// # Errors
    ///
    /// - [`HuddleError::NotFound`] when no user has that display name
    /// - [`HuddleError::InvalidRequest`] on self-requests
    /// - [`HuddleError::DuplicateRelationship`] when any record already
    ///   exists between the two users, in either direction
    pub async fn send_request(
        &self,
        from_user_id: &str,
        target_display_name: &str,
    ) -> Result<RelationshipRecord> {
        let target = self
            .store
            .find_profile_by_display_name(target_display_name)
            .await?
            .ok_or_else(|| HuddleError::not_found("User", target_display_name))?;

        if target.id == from_user_id {
            return Err(HuddleError::invalid_request(
                "cannot send a friend request to yourself",
            ));
        }

        if self
            .store
            .find_record_between(from_user_id, &target.id)
            .await?
            .is_some()
        {
            return Err(HuddleError::duplicate_relationship(from_user_id, &target.id));
        }

        let record = self.store.insert_request(from_user_id, &target.id).await?;
        info!(
            "[RelationshipService] sent friend request {} to {}",
            record.id, target.id
        );
        Ok(record)
    }

    /// Accepts or declines an inbound request.
    ///
    /// Accept updates the record; the resulting feed event removes the
    /// pending entry and triggers the friends re-fetch for both parties.
    /// Decline deletes the record and drops the local pending entry
    /// immediately; the feed's delete echo is then a no-op.
    pub async fn respond_to_request(
        &self,
        request_id: &str,
        response: RequestResponse,
    ) -> Result<()> {
        match response {
            RequestResponse::Accept => {
                self.store.accept_request(request_id).await?;
                info!("[RelationshipService] accepted request {request_id}");
            }
            RequestResponse::Decline => {
                self.store.delete_record(request_id).await?;
                self.state.remove_pending_request(request_id);
                info!("[RelationshipService] declined request {request_id}");
            }
        }
        Ok(())
    }

    /// Removes an accepted friend.
    ///
    /// The mutation is applied to the local cache immediately; the
    /// feed's delete echo finds no matching pending entry and is
    /// ignored.
    pub async fn remove_friend(&self, user_id: &str, counterparty_id: &str) -> Result<()> {
        let record = self
            .store
            .find_record_between(user_id, counterparty_id)
            .await?
            .ok_or_else(|| HuddleError::not_found("Relationship", counterparty_id))?;

        self.store.delete_record(&record.id).await?;
        self.state.remove_friend(counterparty_id);
        info!("[RelationshipService] removed friend {counterparty_id}");
        Ok(())
    }

    /// Searches user profiles, excluding the caller, current friends and
    /// users with a pending request already on display.
    pub async fn search_users(
        &self,
        query: &str,
        current_user_id: &str,
    ) -> Result<Vec<UserProfile>> {
        let profiles = self.store.search_profiles(query).await?;
        let snapshot = self.state.snapshot();

        Ok(profiles
            .into_iter()
            .filter(|profile| {
                profile.id != current_user_id
                    && snapshot.friend(&profile.id).is_none()
                    && !snapshot
                        .pending_requests()
                        .iter()
                        .any(|request| request.from.id == profile.id)
            })
            .collect())
    }
}
