use strum_macros::IntoStaticStr;

use super::types::GroupId;
use crate::store::{EventRecord, UserSummary};

/// A completed state change worth broadcasting
///
/// Domain events are facts produced after a successful mutation. They live
/// for a single dispatch and are never stored.
#[derive(Debug, Clone, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DomainEvent {
    /// An event changed; carries the full record with attendees
    EventUpdated { event: EventRecord },

    /// A user was added to an event's attendees
    UserJoinedEvent {
        event_id: GroupId,
        user: UserSummary,
        attendee_count: usize,
    },
}

impl DomainEvent {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}
