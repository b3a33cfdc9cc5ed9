//! Subscription channel manager.
//!
//! Owns the lifecycle of one logical live-update channel: connect,
//! authorize, listen, detect failure, back off, retry, tear down. Every
//! parsed event is forwarded verbatim to the applier queue; the manager
//! performs no interpretation of payloads beyond the boundary parse.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use huddle_core::auth::Credential;
use huddle_core::config::SyncConfig;
use huddle_core::error::Result;
use huddle_core::relationship::ChangeEvent;

use super::transport::{ChannelTransport, EventStream};
use super::ChannelState;

/// Manages one logical live-update channel per signed-in session.
///
/// State machine: `disconnected → connecting → connected`, `connecting →
/// error` on a failed handshake, `connected → error` on mid-stream
/// failure, `error → connecting` on an automatic or explicit retry, and
/// any state `→ disconnected` on [`stop`](Self::stop).
///
/// Every connection epoch is tagged with a generation counter. Any
/// resumption (a connect result, a stream item, a retry timer) whose
/// generation no longer matches the current one is discarded, so a stale
/// callback arriving after `stop()` can never resurrect the channel.
pub struct SubscriptionChannel {
    transport: Arc<dyn ChannelTransport>,
    config: SyncConfig,
    events_tx: mpsc::Sender<ChangeEvent>,
    state_tx: watch::Sender<ChannelState>,
    inner: Mutex<Inner>,
}

struct Inner {
    /// Current connection epoch; bumped on start/stop/retry
    generation: u64,
    /// User the channel is (or was last) scoped to
    user_id: Option<String>,
    /// Credential captured at start, reused by explicit retry
    credential: Option<Credential>,
    /// Failed attempts in the current error streak
    attempts: u32,
    /// The connection worker for the current generation
    worker: Option<JoinHandle<()>>,
}

impl SubscriptionChannel {
    /// Creates a channel manager that forwards parsed events into
    /// `events_tx`.
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        config: SyncConfig,
        events_tx: mpsc::Sender<ChangeEvent>,
    ) -> Self {
        let (state_tx, _rx) = watch::channel(ChannelState::Disconnected);
        Self {
            transport,
            config,
            events_tx,
            state_tx,
            inner: Mutex::new(Inner {
                generation: 0,
                user_id: None,
                credential: None,
                attempts: 0,
                worker: None,
            }),
        }
    }

    /// Subscribes to connectivity-state transitions.
    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    /// The current connectivity state.
    pub fn current_state(&self) -> ChannelState {
        self.state_tx.borrow().clone()
    }

    /// Opens the channel for the given user.
    ///
    /// No-op when a channel for the same user is already connecting or
    /// connected. A channel for a different user is torn down first.
    /// Progress is reported through the [`ChannelState`] observable, not
    /// a return value, since the operation may resolve only after
    /// retries.
    pub async fn start(self: &Arc<Self>, user_id: impl Into<String>, credential: Credential) {
        let user_id = user_id.into();
        let mut inner = self.inner.lock().await;

        let same_user = inner.user_id.as_deref() == Some(user_id.as_str());
        if same_user && self.state_tx.borrow().is_active() {
            debug!("[SubscriptionChannel] start ignored: channel already active for {user_id}");
            return;
        }

        inner.teardown();
        inner.user_id = Some(user_id.clone());
        inner.credential = Some(credential.clone());

        info!("[SubscriptionChannel] starting channel for {user_id}");
        self.spawn_worker(&mut inner, user_id, credential);
    }

    /// Tears down the channel unconditionally and resets the retry
    /// counter. Safe to call from any state, including before a
    /// successful connect.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        inner.teardown();
        inner.user_id = None;
        inner.credential = None;
        self.state_tx.send_replace(ChannelState::Disconnected);
        debug!("[SubscriptionChannel] stopped");
    }

    /// Explicit retry from the terminal error state.
    ///
    /// Resets the attempt counter and reconnects with the credential
    /// captured at [`start`](Self::start). No-op in any other state.
    pub async fn retry(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        if !self.state_tx.borrow().is_error() {
            debug!("[SubscriptionChannel] retry ignored: channel is not in error state");
            return;
        }
        let (Some(user_id), Some(credential)) =
            (inner.user_id.clone(), inner.credential.clone())
        else {
            debug!("[SubscriptionChannel] retry ignored: no session to retry");
            return;
        };

        inner.teardown();
        inner.user_id = Some(user_id.clone());
        inner.credential = Some(credential.clone());

        info!("[SubscriptionChannel] explicit retry for {user_id}");
        self.spawn_worker(&mut inner, user_id, credential);
    }

    /// Spawns the connection worker for a fresh generation. Caller holds
    /// the inner lock; `teardown` must already have run.
    fn spawn_worker(self: &Arc<Self>, inner: &mut Inner, user_id: String, credential: Credential) {
        let generation = inner.generation;
        self.state_tx.send_replace(ChannelState::Connecting);
        let this = Arc::clone(self);
        inner.worker = Some(tokio::spawn(this.run(generation, user_id, credential)));
    }

    /// Connection supervisor for one generation: connect, pump, back off,
    /// reconnect, until terminal error, teardown, or a newer generation.
    async fn run(self: Arc<Self>, generation: u64, user_id: String, credential: Credential) {
        loop {
            if !self.publish_if_current(generation, ChannelState::Connecting).await {
                return;
            }

            match self.connect_once(&user_id, &credential).await {
                Ok(stream) => {
                    if !self.publish_if_current(generation, ChannelState::Connected).await {
                        return;
                    }
                    // A stable connection forgives prior failures.
                    self.inner.lock().await.attempts = 0;
                    info!("[SubscriptionChannel] connected for {user_id}");

                    let reason = self.pump(generation, stream).await;
                    let Some(reason) = reason else {
                        return; // stale generation or consumer gone
                    };
                    if !self.fail_and_backoff(generation, reason).await {
                        return;
                    }
                }
                Err(err) => {
                    if !self.fail_and_backoff(generation, err.to_string()).await {
                        return;
                    }
                }
            }
        }
    }

    /// Exchanges the credential for authorization and opens the listen.
    async fn connect_once(&self, user_id: &str, credential: &Credential) -> Result<EventStream> {
        let token = self.transport.authorize(credential).await?;
        self.transport.subscribe(user_id, &token).await
    }

    /// Forwards stream items until the stream fails or ends.
    ///
    /// Returns the failure reason, or `None` when the pump should stop
    /// silently (stale generation, applier queue closed).
    async fn pump(&self, generation: u64, mut stream: EventStream) -> Option<String> {
        loop {
            match stream.next().await {
                Some(Ok(payload)) => {
                    if !self.is_current(generation).await {
                        return None;
                    }
                    match ChangeEvent::from_value(payload) {
                        Ok(event) => {
                            if self.events_tx.send(event).await.is_err() {
                                debug!("[SubscriptionChannel] event queue closed, stopping pump");
                                return None;
                            }
                        }
                        Err(err) => {
                            warn!("[SubscriptionChannel] dropping malformed payload: {err}");
                        }
                    }
                }
                Some(Err(err)) => return Some(err.to_string()),
                None => return Some("event stream ended".to_string()),
            }
        }
    }

    /// Publishes the error state and sleeps out the backoff delay.
    ///
    /// Returns true when the supervisor should attempt to reconnect,
    /// false when it should exit: attempts exhausted (state stays
    /// `Error` until an explicit retry) or the generation moved on.
    async fn fail_and_backoff(&self, generation: u64, reason: String) -> bool {
        if !self
            .publish_if_current(
                generation,
                ChannelState::Error {
                    reason: reason.clone(),
                },
            )
            .await
        {
            return false;
        }

        let (attempt, delay) = {
            let mut inner = self.inner.lock().await;
            if inner.attempts >= self.config.max_retries {
                warn!(
                    "[SubscriptionChannel] giving up after {} failed attempts: {reason}",
                    inner.attempts + 1
                );
                return false;
            }
            let delay = self.config.backoff_delay(inner.attempts);
            inner.attempts += 1;
            (inner.attempts, delay)
        };

        warn!(
            "[SubscriptionChannel] connection failed (attempt {attempt}, next retry in {}ms): {reason}",
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;

        self.is_current(generation).await
    }

    /// Publishes a state transition unless the generation is stale.
    ///
    /// The inner lock serializes this against `stop`/`start`, so a stale
    /// worker can never overwrite the state a newer epoch published.
    async fn publish_if_current(&self, generation: u64, state: ChannelState) -> bool {
        let inner = self.inner.lock().await;
        if inner.generation != generation {
            return false;
        }
        self.state_tx.send_replace(state);
        true
    }

    async fn is_current(&self, generation: u64) -> bool {
        self.inner.lock().await.generation == generation
    }
}

impl Inner {
    /// Invalidates the current generation and aborts its worker,
    /// cancelling any in-flight connect or retry timer.
    fn teardown(&mut self) {
        self.generation += 1;
        self.attempts = 0;
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
