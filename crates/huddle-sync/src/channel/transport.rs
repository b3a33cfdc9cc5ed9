//! Channel transport trait.
//!
//! The push mechanism itself is a black box: something that exchanges a
//! session credential for channel authorization and then yields a stream
//! of raw payloads, server-side filtered to events involving the
//! subscribing user. Connection management, backoff and interpretation
//! of the payloads all live elsewhere.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use huddle_core::auth::Credential;
use huddle_core::error::Result;

/// An opaque authorization handle for one channel subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelToken(pub String);

/// Raw payloads as delivered by the push feed.
///
/// Items are untyped; the channel manager parses them at the boundary
/// and drops anything malformed.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<serde_json::Value>> + Send>>;

/// A black-box live-update event source.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Exchanges the session credential for channel authorization.
    ///
    /// # Errors
    ///
    /// Returns an error when the credential is rejected or the exchange
    /// endpoint is unreachable; both are treated as transient by the
    /// channel manager.
    async fn authorize(&self, credential: &Credential) -> Result<ChannelToken>;

    /// Opens a listen filtered to events where the given user is
    /// involved.
    ///
    /// The returned stream ends (or yields an error) on mid-stream
    /// failure; the channel manager owns reconnection.
    async fn subscribe(&self, user_id: &str, token: &ChannelToken) -> Result<EventStream>;
}
