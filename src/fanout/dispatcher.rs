use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::domain_event::DomainEvent;
use super::messages::{MessageTag, UserJoinedPayload, WebSocketMessage};
use super::registry::{ConnectionRegistry, DeliveryTarget};
use super::types::ConnectionId;

/// Why a single delivery attempt failed
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    #[error("Connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    #[error("Failed to serialize message: {0}")]
    Serialization(String),
}

/// Outcome of one (target, message) attempt
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub connection_id: ConnectionId,
    pub tag: String,
    pub outcome: Result<(), DeliveryError>,
}

/// Per-target results of a dispatch, kept for logging and tests
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub deliveries: Vec<DeliveryRecord>,
    pub errors: Vec<DeliveryError>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.iter().filter(|d| d.outcome.is_err()).count() + self.errors.len()
    }
}

/// Who a user-joined notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
enum Audience {
    Room,
    Everyone,
}

/// Sink for domain events produced by successful mutations
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &DomainEvent) -> DispatchReport;
}

/// Turns domain events into point-to-point deliveries
///
/// Delivery is best-effort: a closed channel is logged and skipped, the
/// remaining targets are still attempted, and nothing is retried.
pub struct BroadcastDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn dispatch(&self, event: &DomainEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        match event {
            DomainEvent::EventUpdated { event: record } => {
                let targets = self.registry.snapshot(None);
                let message = WebSocketMessage::event_updated(record);
                deliver_all(&mut report, &MessageTag::EventUpdated, message, &targets.everyone);
            }
            DomainEvent::UserJoinedEvent {
                event_id,
                user,
                attendee_count,
            } => {
                let snapshot = self.registry.snapshot(Some(event_id));
                let payload = UserJoinedPayload {
                    event_id: event_id.clone(),
                    user: user.clone(),
                    attendee_count: *attendee_count,
                };

                for audience in Audience::iter() {
                    let (tag, targets) = match audience {
                        Audience::Room => (MessageTag::UserJoinedEvent, &snapshot.room),
                        Audience::Everyone => (
                            MessageTag::EventUserJoined(event_id.clone()),
                            &snapshot.everyone,
                        ),
                    };
                    let message = WebSocketMessage::user_joined(&tag, &payload);
                    deliver_all(&mut report, &tag, message, targets);
                }
            }
        }

        info!(
            event = event.kind(),
            delivered = report.delivered(),
            failed = report.failed(),
            "Domain event dispatched"
        );
        report
    }
}

impl EventPublisher for BroadcastDispatcher {
    fn publish(&self, event: &DomainEvent) -> DispatchReport {
        self.dispatch(event)
    }
}

fn deliver_all(
    report: &mut DispatchReport,
    tag: &MessageTag,
    message: Result<WebSocketMessage, serde_json::Error>,
    targets: &[DeliveryTarget],
) {
    let tag_name = tag.wire_name();

    let frame = match message.and_then(|m| m.to_json()) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(tag = %tag_name, error = %e, "Failed to serialize broadcast message");
            report.errors.push(DeliveryError::Serialization(e.to_string()));
            return;
        }
    };

    debug!(tag = %tag_name, targets = targets.len(), "Delivering broadcast");

    for target in targets {
        let outcome = target
            .sender
            .send(frame.clone())
            .map_err(|_| DeliveryError::ConnectionClosed(target.connection_id));

        if let Err(e) = &outcome {
            warn!(
                connection_id = %target.connection_id,
                tag = %tag_name,
                error = %e,
                "Delivery failed, skipping target"
            );
        }

        report.deliveries.push(DeliveryRecord {
            connection_id: target.connection_id,
            tag: tag_name.clone(),
            outcome,
        });
    }
}
