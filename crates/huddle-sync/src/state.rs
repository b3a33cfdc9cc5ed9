//! Shared observable relationship state.

use std::sync::Arc;

use tokio::sync::watch;

use huddle_core::relationship::{Friend, PendingRequest, RelationshipCache};

/// The cache wrapped in a `watch` channel so UI consumers observe whole
/// snapshots.
///
/// Every mutation goes through `send_modify`, which applies the change
/// and publishes the new snapshot in a single step; a consumer reading
/// mid-update can never observe a torn state. Writers are the event
/// applier (reconciliation) and the relationship service (hydration and
/// local friend removal); nothing else mutates the cache.
#[derive(Clone)]
pub struct SharedRelationshipState {
    tx: Arc<watch::Sender<RelationshipCache>>,
}

impl SharedRelationshipState {
    /// Creates an empty shared state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RelationshipCache::new());
        Self { tx: Arc::new(tx) }
    }

    /// Subscribes to cache snapshots.
    pub fn subscribe(&self) -> watch::Receiver<RelationshipCache> {
        self.tx.subscribe()
    }

    /// Clones the current snapshot.
    pub fn snapshot(&self) -> RelationshipCache {
        self.tx.borrow().clone()
    }

    /// Replaces both collections in one atomic publish (hydration).
    pub fn replace_all(&self, friends: Vec<Friend>, pending: Vec<PendingRequest>) {
        self.tx.send_modify(|cache| {
            cache.replace_friends(friends);
            cache.replace_pending_requests(pending);
        });
    }

    /// Replaces the friend collection.
    pub fn replace_friends(&self, friends: Vec<Friend>) {
        self.tx.send_modify(|cache| cache.replace_friends(friends));
    }

    /// Inserts a pending request unless its record id is already present.
    pub fn upsert_pending_request(&self, request: PendingRequest) {
        self.tx
            .send_modify(|cache| cache.upsert_pending_request(request));
    }

    /// Removes a pending request by record id (no-op when absent).
    pub fn remove_pending_request(&self, record_id: &str) {
        self.tx.send_modify(|cache| {
            cache.remove_pending_request(record_id);
        });
    }

    /// Removes a friend by counterparty id (no-op when absent).
    pub fn remove_friend(&self, counterparty_id: &str) {
        self.tx.send_modify(|cache| {
            cache.remove_friend(counterparty_id);
        });
    }

    /// Clears both collections (logout).
    pub fn clear(&self) {
        self.tx.send_modify(|cache| cache.clear());
    }
}

impl Default for SharedRelationshipState {
    fn default() -> Self {
        Self::new()
    }
}
