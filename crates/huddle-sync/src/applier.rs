//! Applies reconciler output to the shared state.
//!
//! The applier is the only consumer of the parsed-event queue. For each
//! event it runs the pure reconciler and then executes the result:
//! cache mutations against [`SharedRelationshipState`] and side-effect
//! intents (notification delivery, friends re-hydration) against the
//! collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use huddle_core::notify::{NotificationIntent, NotificationSink};
use huddle_core::relationship::{
    reconcile, CacheOp, ChangeEvent, Effect, PeerSummary, PendingRequest, RelationshipStatus,
    RelationshipStore,
};

use crate::state::SharedRelationshipState;

/// Display label used when the requester profile cannot be resolved.
///
/// State correctness takes priority over notification completeness: the
/// pending request is still inserted under this label, and only the
/// notification is dropped.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// Executes reconciliations against the shared state and collaborators.
pub struct EventApplier {
    store: Arc<dyn RelationshipStore>,
    sink: Arc<dyn NotificationSink>,
    state: SharedRelationshipState,
}

impl EventApplier {
    pub fn new(
        store: Arc<dyn RelationshipStore>,
        sink: Arc<dyn NotificationSink>,
        state: SharedRelationshipState,
    ) -> Self {
        Self { store, sink, state }
    }

    /// Applies one change event on behalf of the given user.
    ///
    /// Each cache mutation is a single synchronous call on the shared
    /// state, applied at the resumption point of any lookup it needed, so
    /// consumers never observe a partial update.
    pub async fn apply(&self, current_user_id: &str, event: &ChangeEvent) {
        let reconciliation = reconcile(current_user_id, event);
        if reconciliation.is_empty() {
            debug!(
                "[EventApplier] ignoring {} event for record {}",
                event.operation, event.record.id
            );
            return;
        }

        // Display names resolved while applying inserts, so the matching
        // notification effect reuses the lookup.
        let mut resolved: HashMap<String, String> = HashMap::new();

        for op in &reconciliation.cache_ops {
            match op {
                CacheOp::InsertPending {
                    record_id,
                    requester_id,
                } => {
                    let display_name = match self.store.get_profile(requester_id).await {
                        Ok(Some(profile)) => {
                            resolved.insert(requester_id.clone(), profile.display_name.clone());
                            profile.display_name
                        }
                        Ok(None) => {
                            warn!(
                                "[EventApplier] no profile for requester {requester_id}, using placeholder"
                            );
                            UNKNOWN_DISPLAY_NAME.to_string()
                        }
                        Err(err) => {
                            warn!(
                                "[EventApplier] profile lookup failed for {requester_id}: {err}, using placeholder"
                            );
                            UNKNOWN_DISPLAY_NAME.to_string()
                        }
                    };

                    self.state.upsert_pending_request(PendingRequest {
                        id: record_id.clone(),
                        from: PeerSummary {
                            id: requester_id.clone(),
                            display_name,
                        },
                        status: RelationshipStatus::Pending,
                    });
                }
                CacheOp::RemovePending { record_id } => {
                    self.state.remove_pending_request(record_id);
                }
            }
        }

        for effect in &reconciliation.effects {
            match effect {
                Effect::NotifyNewRequest { requester_id } => {
                    // Dropped when the lookup above failed.
                    if let Some(display_name) = resolved.get(requester_id) {
                        self.sink
                            .deliver(NotificationIntent::NewRequest {
                                from_display_name: display_name.clone(),
                            })
                            .await;
                    } else {
                        warn!(
                            "[EventApplier] dropping notification for unresolved requester {requester_id}"
                        );
                    }
                }
                Effect::RefreshFriends => match self.store.fetch_friends(current_user_id).await {
                    Ok(friends) => self.state.replace_friends(friends),
                    Err(err) => {
                        // Cache untouched; the next hydration catches up.
                        warn!("[EventApplier] friends refresh failed: {err}");
                    }
                },
            }
        }
    }
}
