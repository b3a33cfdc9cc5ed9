//! The subscription channel: lifecycle of one logical live-update feed.
//!
//! Decouples "how to get a live feed" (this module) from "what a feed
//! event means" (the reconciler): the retry/backoff state machine stays
//! free of business logic.

pub mod manager;
pub mod transport;

use serde::Serialize;

pub use manager::SubscriptionChannel;
pub use transport::{ChannelToken, ChannelTransport, EventStream};

/// Connectivity state of the live-update channel.
///
/// Owned exclusively by the [`SubscriptionChannel`]; exactly one value is
/// active per logical session, and transitions through the `watch`
/// observable are the only way consumers learn connectivity health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, strum::Display)]
#[serde(tag = "state", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChannelState {
    /// No channel exists (initial state, or after an explicit stop)
    Disconnected,
    /// A connection attempt is in flight
    Connecting,
    /// The live feed is established
    Connected,
    /// The last attempt failed; retried automatically until the attempt
    /// ceiling, then parked here until an explicit retry
    Error { reason: String },
}

impl ChannelState {
    /// Returns true for the `Error` state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns true while a channel is being established or is live.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}
