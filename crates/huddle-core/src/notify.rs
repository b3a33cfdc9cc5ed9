//! Notification sink collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A discrete notification intent produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NotificationIntent {
    /// A new inbound friend request arrived.
    NewRequest {
        /// Display name of the requester (already resolved)
        from_display_name: String,
    },
}

/// Consumes notification intents, fire-and-forget.
///
/// Delivery failure is not a subsystem concern: callers log and move on,
/// and no acknowledgment is expected.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, intent: NotificationIntent);
}
