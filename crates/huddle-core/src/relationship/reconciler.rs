//! Pure reconciliation of one change event against the local cache.
//!
//! The reconciler turns a [`ChangeEvent`] into a description of the cache
//! mutations to apply plus zero or more side-effect intents. It performs
//! no I/O itself; the orchestration layer executes the output. Keeping
//! this a pure function is what makes the event semantics independently
//! testable from the retry/backoff machinery.

use super::event::{ChangeEvent, ChangeOperation};
use super::model::RelationshipStatus;

/// A single cache mutation the reconciler wants applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    /// Insert a pending request for the given record, unless one with the
    /// same record id already exists.
    ///
    /// The requester's display name is not part of the change payload;
    /// the applier resolves it (degrading to a placeholder on failure).
    InsertPending {
        record_id: String,
        requester_id: String,
    },
    /// Remove the pending request with the given record id, if present.
    RemovePending { record_id: String },
}

/// A side-effect intent produced alongside the cache mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Surface a "new friend request" notification for the requester.
    ///
    /// Dropped by the applier when the display-name lookup fails: state
    /// correctness takes priority over notification completeness.
    NotifyNewRequest { requester_id: String },
    /// Re-fetch the full friend list. Accepting a request changes both
    /// parties' friend lists, and the change payload lacks the
    /// denormalized display fields a local patch would need.
    RefreshFriends,
}

/// The reconciler's output for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Cache mutations, to be applied in order
    pub cache_ops: Vec<CacheOp>,
    /// Side-effect intents
    pub effects: Vec<Effect>,
}

impl Reconciliation {
    /// Returns true when the event was ignored entirely.
    pub fn is_empty(&self) -> bool {
        self.cache_ops.is_empty() && self.effects.is_empty()
    }
}

/// Applies one incoming change event to the current user's view.
///
/// Applying the same event twice yields output whose application leaves
/// the cache identical to applying it once: inserts go through
/// upsert-by-record-id and removes tolerate absent ids.
pub fn reconcile(current_user_id: &str, event: &ChangeEvent) -> Reconciliation {
    let record = &event.record;

    match event.operation {
        ChangeOperation::Insert => {
            // Only inbound pending requests become visible. Anything else
            // is a filter mismatch or an echo of our own outgoing request.
            let is_pending = record.status == Some(RelationshipStatus::Pending);
            let is_recipient = record.recipient_id.as_deref() == Some(current_user_id);

            match (&record.requester_id, is_pending && is_recipient) {
                (Some(requester_id), true) => Reconciliation {
                    cache_ops: vec![CacheOp::InsertPending {
                        record_id: record.id.clone(),
                        requester_id: requester_id.clone(),
                    }],
                    effects: vec![Effect::NotifyNewRequest {
                        requester_id: requester_id.clone(),
                    }],
                },
                _ => Reconciliation::default(),
            }
        }
        ChangeOperation::Update => {
            if record.status != Some(RelationshipStatus::Accepted) {
                return Reconciliation::default();
            }

            // Update payloads may carry only the id and status; the feed
            // is server-side filtered to "involves me", so absent party
            // ids are trusted. Present ids are checked defensively.
            let involved = match (&record.requester_id, &record.recipient_id) {
                (None, None) => true,
                (requester, recipient) => {
                    requester.as_deref() == Some(current_user_id)
                        || recipient.as_deref() == Some(current_user_id)
                }
            };
            if !involved {
                return Reconciliation::default();
            }

            Reconciliation {
                cache_ops: vec![CacheOp::RemovePending {
                    record_id: record.id.clone(),
                }],
                effects: vec![Effect::RefreshFriends],
            }
        }
        ChangeOperation::Delete => Reconciliation {
            // Covers decline. When no matching pending request exists this
            // is a friend-removal echo and the removal is a no-op.
            cache_ops: vec![CacheOp::RemovePending {
                record_id: record.id.clone(),
            }],
            effects: vec![],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::cache::RelationshipCache;
    use crate::relationship::event::RecordPayload;
    use crate::relationship::model::{PeerSummary, PendingRequest};

    fn insert_event(record_id: &str, requester: &str, recipient: &str) -> ChangeEvent {
        ChangeEvent {
            operation: ChangeOperation::Insert,
            record: RecordPayload {
                id: record_id.to_string(),
                requester_id: Some(requester.to_string()),
                recipient_id: Some(recipient.to_string()),
                status: Some(RelationshipStatus::Pending),
            },
        }
    }

    fn apply(cache: &mut RelationshipCache, reconciliation: &Reconciliation) {
        for op in &reconciliation.cache_ops {
            match op {
                CacheOp::InsertPending {
                    record_id,
                    requester_id,
                } => cache.upsert_pending_request(PendingRequest {
                    id: record_id.clone(),
                    from: PeerSummary {
                        id: requester_id.clone(),
                        display_name: requester_id.clone(),
                    },
                    status: RelationshipStatus::Pending,
                }),
                CacheOp::RemovePending { record_id } => {
                    cache.remove_pending_request(record_id);
                }
            }
        }
    }

    #[test]
    fn test_inbound_pending_insert_yields_upsert_and_notification() {
        let reconciliation = reconcile("U1", &insert_event("r1", "U2", "U1"));

        assert_eq!(
            reconciliation.cache_ops,
            vec![CacheOp::InsertPending {
                record_id: "r1".to_string(),
                requester_id: "U2".to_string(),
            }]
        );
        assert_eq!(
            reconciliation.effects,
            vec![Effect::NotifyNewRequest {
                requester_id: "U2".to_string(),
            }]
        );
    }

    #[test]
    fn test_insert_for_other_recipient_is_ignored() {
        let reconciliation = reconcile("U1", &insert_event("r1", "U1", "U3"));
        assert!(reconciliation.is_empty());
    }

    #[test]
    fn test_insert_with_non_pending_status_is_ignored() {
        let mut event = insert_event("r1", "U2", "U1");
        event.record.status = Some(RelationshipStatus::Accepted);

        assert!(reconcile("U1", &event).is_empty());
    }

    #[test]
    fn test_accept_update_removes_pending_and_requests_refresh() {
        // Scenario B shape: the update carries only id and status.
        let event = ChangeEvent {
            operation: ChangeOperation::Update,
            record: RecordPayload {
                id: "r1".to_string(),
                requester_id: None,
                recipient_id: None,
                status: Some(RelationshipStatus::Accepted),
            },
        };

        let reconciliation = reconcile("U1", &event);

        assert_eq!(
            reconciliation.cache_ops,
            vec![CacheOp::RemovePending {
                record_id: "r1".to_string(),
            }]
        );
        assert_eq!(reconciliation.effects, vec![Effect::RefreshFriends]);
    }

    #[test]
    fn test_accept_update_for_uninvolved_parties_is_ignored() {
        let event = ChangeEvent {
            operation: ChangeOperation::Update,
            record: RecordPayload {
                id: "r1".to_string(),
                requester_id: Some("U2".to_string()),
                recipient_id: Some("U3".to_string()),
                status: Some(RelationshipStatus::Accepted),
            },
        };

        assert!(reconcile("U1", &event).is_empty());
    }

    #[test]
    fn test_update_to_pending_is_ignored() {
        let event = ChangeEvent {
            operation: ChangeOperation::Update,
            record: RecordPayload {
                id: "r1".to_string(),
                requester_id: None,
                recipient_id: None,
                status: Some(RelationshipStatus::Pending),
            },
        };

        assert!(reconcile("U1", &event).is_empty());
    }

    #[test]
    fn test_delete_removes_pending_by_record_id() {
        let event = ChangeEvent {
            operation: ChangeOperation::Delete,
            record: RecordPayload {
                id: "r1".to_string(),
                requester_id: None,
                recipient_id: None,
                status: None,
            },
        };

        let reconciliation = reconcile("U1", &event);
        assert_eq!(
            reconciliation.cache_ops,
            vec![CacheOp::RemovePending {
                record_id: "r1".to_string(),
            }]
        );
        assert!(reconciliation.effects.is_empty());
    }

    #[test]
    fn test_duplicate_insert_applies_once() {
        // Scenario C: two identical inserts back to back.
        let event = insert_event("r1", "U2", "U1");
        let mut cache = RelationshipCache::new();

        apply(&mut cache, &reconcile("U1", &event));
        apply(&mut cache, &reconcile("U1", &event));

        assert_eq!(cache.pending_requests().len(), 1);
        assert_eq!(cache.pending_requests()[0].id, "r1");
    }

    #[test]
    fn test_delete_for_unknown_record_is_safe() {
        let event = ChangeEvent {
            operation: ChangeOperation::Delete,
            record: RecordPayload {
                id: "never-seen".to_string(),
                requester_id: None,
                recipient_id: None,
                status: None,
            },
        };

        let mut cache = RelationshipCache::new();
        apply(&mut cache, &reconcile("U1", &event));

        assert!(cache.is_empty());
    }
}
