//! huddle-sync: orchestration layer of the huddle synchronization
//! subsystem.
//!
//! Wires the pure domain layer (huddle-core) to the collaborators: the
//! subscription channel manager, the session lifecycle controller, the
//! relationship query service and the shared observable state. All
//! tasks the subsystem owns are spawned here.

pub mod applier;
pub mod channel;
pub mod service;
pub mod session;
pub mod state;

pub use applier::EventApplier;
pub use channel::{ChannelState, ChannelToken, ChannelTransport, EventStream, SubscriptionChannel};
pub use service::{RelationshipService, RequestResponse};
pub use session::{SessionController, SessionStatus};
pub use state::SharedRelationshipState;
