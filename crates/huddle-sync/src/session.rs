//! Session lifecycle controller.
//!
//! Observes the ambient authentication session and owns the decision of
//! when the cache and the live channel exist: hydrate and start on
//! login, stop and clear on logout, and treat repeated signals for the
//! same identity (token refresh) as no-ops. It never mutates cache
//! contents itself beyond clearing on logout.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use huddle_core::auth::{AuthProvider, Identity};
use huddle_core::config::SyncConfig;
use huddle_core::notify::NotificationSink;
use huddle_core::relationship::{ChangeEvent, RelationshipCache, RelationshipStore};

use crate::applier::EventApplier;
use crate::channel::{ChannelState, ChannelTransport, SubscriptionChannel};
use crate::service::RelationshipService;
use crate::state::SharedRelationshipState;

/// Lifecycle state of the signed-in session's synchronization.
///
/// Distinct from [`ChannelState`], which the channel manager owns
/// exclusively: this reflects the hydration/login phase that happens
/// before the channel exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, strum::Display)]
#[serde(tag = "status", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    /// No identity present
    SignedOut,
    /// Bulk fetch of friends and pending requests in flight
    Hydrating,
    /// The initial bulk fetch failed; the live channel was not started
    /// on top of the unhydrated cache. Retryable via
    /// [`SessionController::retry_hydration`].
    HydrationFailed { reason: String },
    /// Cache hydrated and live channel started
    Live,
}

/// Wires the collaborators together and drives them from the identity
/// signal.
///
/// All cache writes funnel through the single run-loop task (events) or
/// through the service's own calls; there is no parallel mutation of
/// the subsystem's state.
pub struct SessionController {
    auth: Arc<dyn AuthProvider>,
    service: Arc<RelationshipService>,
    channel: Arc<SubscriptionChannel>,
    applier: EventApplier,
    state: SharedRelationshipState,
    status_tx: watch::Sender<SessionStatus>,
    /// Last identity observed on the auth signal
    current: Mutex<Option<Identity>>,
    /// Receiver half of the parsed-event queue, taken by the run loop
    events_rx: std::sync::Mutex<Option<mpsc::Receiver<ChangeEvent>>>,
    cancel: CancellationToken,
}

impl SessionController {
    /// Builds the full subsystem around the given collaborators.
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn RelationshipStore>,
        transport: Arc<dyn ChannelTransport>,
        sink: Arc<dyn NotificationSink>,
        config: SyncConfig,
    ) -> Self {
        let state = SharedRelationshipState::new();
        let (events_tx, events_rx) = mpsc::channel(config.event_queue_size);
        let channel = Arc::new(SubscriptionChannel::new(transport, config, events_tx));
        let service = Arc::new(RelationshipService::new(
            Arc::clone(&store),
            state.clone(),
        ));
        let applier = EventApplier::new(store, sink, state.clone());
        let (status_tx, _rx) = watch::channel(SessionStatus::SignedOut);

        Self {
            auth,
            service,
            channel,
            applier,
            state,
            status_tx,
            current: Mutex::new(None),
            events_rx: std::sync::Mutex::new(Some(events_rx)),
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribes to relationship-state snapshots (UI consumer surface).
    pub fn relationships(&self) -> watch::Receiver<RelationshipCache> {
        self.state.subscribe()
    }

    /// Subscribes to the channel's connectivity state.
    pub fn channel_state(&self) -> watch::Receiver<ChannelState> {
        self.channel.state()
    }

    /// Subscribes to the session synchronization status.
    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// The query service for commands (send/respond/remove/search).
    pub fn service(&self) -> Arc<RelationshipService> {
        Arc::clone(&self.service)
    }

    /// The channel manager, for explicit `retry()` from the UI.
    pub fn channel(&self) -> Arc<SubscriptionChannel> {
        Arc::clone(&self.channel)
    }

    /// Spawns the run loop. Call once.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await })
    }

    /// Stops the run loop and tears down the channel.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.channel.stop().await;
    }

    /// Drives identity transitions and incoming events on one task.
    async fn run(self: Arc<Self>) {
        let Some(mut events_rx) = self.events_rx.lock().ok().and_then(|mut rx| rx.take()) else {
            error!("[SessionController] run loop started twice, refusing");
            return;
        };
        let mut identity_rx = self.auth.identity_changes();

        // An identity may already be present at startup.
        let initial = identity_rx.borrow_and_update().clone();
        self.handle_identity(initial).await;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("[SessionController] run loop cancelled");
                    break;
                }
                changed = identity_rx.changed() => {
                    if changed.is_err() {
                        warn!("[SessionController] identity signal closed, stopping");
                        break;
                    }
                    let next = identity_rx.borrow_and_update().clone();
                    self.handle_identity(next).await;
                }
                event = events_rx.recv() => {
                    match event {
                        Some(event) => self.apply_event(&event).await,
                        None => break,
                    }
                }
            }
        }
    }

    /// Applies one parsed change event for the signed-in user.
    async fn apply_event(&self, event: &ChangeEvent) {
        let current = self.current.lock().await.clone();
        match current {
            Some(identity) => self.applier.apply(&identity.user_id, event).await,
            // Event raced a logout; the cache is already cleared.
            None => debug!(
                "[SessionController] dropping event for record {} with no session",
                event.record.id
            ),
        }
    }

    /// Handles one observation of the identity signal.
    async fn handle_identity(&self, next: Option<Identity>) {
        let mut current = self.current.lock().await;

        if *current == next {
            // Token refresh or repeated signal for the same identity.
            if next.is_some() {
                debug!("[SessionController] identity unchanged, ignoring");
            }
            return;
        }

        match next {
            Some(identity) => {
                if current.is_some() {
                    // Account switch: tear down the prior session first.
                    info!("[SessionController] account switch to {}", identity.user_id);
                    self.channel.stop().await;
                    self.state.clear();
                } else {
                    info!("[SessionController] login as {}", identity.user_id);
                }
                *current = Some(identity.clone());
                drop(current);
                self.begin_session(&identity).await;
            }
            None => {
                info!("[SessionController] logout");
                *current = None;
                self.channel.stop().await;
                self.state.clear();
                self.status_tx.send_replace(SessionStatus::SignedOut);
            }
        }
    }

    /// Hydrates the cache and, only on success, starts the live channel.
    ///
    /// Starting a live feed over stale or empty state risks silent
    /// inconsistency, so a hydration failure parks the session in a
    /// retryable error status instead.
    async fn begin_session(&self, identity: &Identity) {
        self.status_tx.send_replace(SessionStatus::Hydrating);

        if let Err(err) = self.service.hydrate(&identity.user_id).await {
            warn!("[SessionController] hydration failed: {err}");
            self.status_tx.send_replace(SessionStatus::HydrationFailed {
                reason: err.to_string(),
            });
            return;
        }

        let credential = match self.auth.credential().await {
            Ok(credential) => credential,
            Err(err) => {
                warn!("[SessionController] credential unavailable: {err}");
                self.status_tx.send_replace(SessionStatus::HydrationFailed {
                    reason: err.to_string(),
                });
                return;
            }
        };

        self.channel.start(identity.user_id.clone(), credential).await;
        self.status_tx.send_replace(SessionStatus::Live);
    }

    /// Re-runs the hydrate-then-start path after a hydration failure.
    ///
    /// No-op when signed out. Safe to call while live: hydration
    /// replaces the cache with fresh store state and the channel start
    /// is a no-op for the same user.
    pub async fn retry_hydration(&self) {
        let identity = self.current.lock().await.clone();
        match identity {
            Some(identity) => self.begin_session(&identity).await,
            None => debug!("[SessionController] retry_hydration ignored: signed out"),
        }
    }
}
