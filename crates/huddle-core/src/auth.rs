//! Authentication collaborator.
//!
//! The subsystem does not manage credentials itself; it observes the
//! ambient session through this trait and asks for the current credential
//! on demand. Token renewal stays with the provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::Result;

/// The signed-in identity, when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque user identifier of the signed-in user
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// A renewable credential used to authorize the live channel.
///
/// Treated as opaque; the provider hands out a fresh value on every call
/// so the subsystem never holds a stale token across reconnects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Supplies the current identity signal and credentials.
///
/// `identity_changes` yields `None` while signed out and `Some(identity)`
/// while signed in; an absent → present transition is a login, present →
/// absent a logout, and present → different-present an account switch.
/// The signal may re-fire for the same identity (e.g. on token refresh);
/// observers must treat that as a no-op.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Subscribes to identity-change notifications.
    fn identity_changes(&self) -> watch::Receiver<Option<Identity>>;

    /// Returns the current credential for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error when no session exists or the credential cannot
    /// be produced.
    async fn credential(&self) -> Result<Credential>;
}
