//! In-memory projection of the current user's relationship state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::{Friend, PendingRequest};

/// The local projection of two collections: accepted friends and inbound
/// pending requests.
///
/// Pure data, no I/O. Friends are keyed by counterparty id (insertion
/// order irrelevant); pending requests keep arrival order, which is a
/// display concern. All mutations are synchronous and total; malformed
/// input is rejected by the caller, never here.
///
/// The cache is `Clone` so a whole snapshot can be published through an
/// observable in a single step; consumers never see a torn intermediate
/// state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipCache {
    /// Accepted friends, keyed by counterparty user id
    friends: HashMap<String, Friend>,
    /// Inbound pending requests in arrival order, unique by record id
    pending: Vec<PendingRequest>,
}

impl RelationshipCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full friend collection.
    pub fn replace_friends(&mut self, friends: Vec<Friend>) {
        self.friends = friends.into_iter().map(|f| (f.id.clone(), f)).collect();
    }

    /// Replaces the full pending-request collection, preserving the given
    /// order and dropping duplicate record ids.
    pub fn replace_pending_requests(&mut self, requests: Vec<PendingRequest>) {
        self.pending.clear();
        for request in requests {
            self.upsert_pending_request(request);
        }
    }

    /// Inserts a pending request unless one with the same record id is
    /// already present.
    ///
    /// The no-op on duplicates is what makes reconciliation idempotent
    /// under duplicate delivery of the same event.
    pub fn upsert_pending_request(&mut self, request: PendingRequest) {
        if self.pending.iter().any(|r| r.id == request.id) {
            return;
        }
        self.pending.push(request);
    }

    /// Removes a pending request by record id. Returns whether an entry
    /// was removed; removing an absent id is a no-op.
    pub fn remove_pending_request(&mut self, record_id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|r| r.id != record_id);
        self.pending.len() != before
    }

    /// Inserts or updates a friend entry, keyed by counterparty id.
    pub fn upsert_friend(&mut self, friend: Friend) {
        self.friends.insert(friend.id.clone(), friend);
    }

    /// Removes a friend by counterparty id. Returns whether an entry was
    /// removed.
    pub fn remove_friend(&mut self, counterparty_id: &str) -> bool {
        self.friends.remove(counterparty_id).is_some()
    }

    /// Clears both collections.
    pub fn clear(&mut self) {
        self.friends.clear();
        self.pending.clear();
    }

    /// Current friends, in no particular order.
    pub fn friends(&self) -> impl Iterator<Item = &Friend> {
        self.friends.values()
    }

    /// Looks up a friend by counterparty id.
    pub fn friend(&self, counterparty_id: &str) -> Option<&Friend> {
        self.friends.get(counterparty_id)
    }

    /// Current pending requests in arrival order.
    pub fn pending_requests(&self) -> &[PendingRequest] {
        &self.pending
    }

    /// Returns true if a pending request with the given record id exists.
    pub fn has_pending(&self, record_id: &str) -> bool {
        self.pending.iter().any(|r| r.id == record_id)
    }

    /// Number of accepted friends.
    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    /// Returns true if both collections are empty.
    pub fn is_empty(&self) -> bool {
        self.friends.is_empty() && self.pending.is_empty()
    }
}
