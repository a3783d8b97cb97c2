// Real-time fan-out of domain events to connected clients
//
// The registry owns live connections and their room memberships; the
// dispatcher turns domain events into deliveries against a registry snapshot.

// Public API - what other modules can use
pub use dispatcher::{
    BroadcastDispatcher, DeliveryError, DeliveryRecord, DispatchReport, EventPublisher,
};
pub use domain_event::DomainEvent;
pub use membership::MembershipTable;
pub use messages::{ClientMessage, MessageTag, UserJoinedPayload, WebSocketMessage};
pub use registry::{ConnectionRegistry, DeliveryTarget, TargetSnapshot};
pub use types::{ConnectionHandle, ConnectionId, GroupId, OutboundSender};

// Internal modules
mod dispatcher;
mod domain_event;
mod membership;
pub mod messages;
mod registry;
mod types;
