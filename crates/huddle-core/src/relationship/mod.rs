//! Relationship domain: models, local cache, change events and the
//! pure reconciler, plus the backing-store trait.

pub mod cache;
pub mod event;
pub mod model;
pub mod reconciler;
pub mod store;

pub use cache::RelationshipCache;
pub use event::{ChangeEvent, ChangeOperation, RecordPayload};
pub use model::{
    Friend, PeerSummary, PendingRequest, RelationshipRecord, RelationshipStatus, UserProfile,
};
pub use reconciler::{reconcile, CacheOp, Effect, Reconciliation};
pub use store::RelationshipStore;
