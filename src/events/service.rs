use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    fanout::{DomainEvent, EventPublisher, GroupId},
    shared::AppError,
    store::{find_user_summary, EventRecord, EventStore},
};

/// Queries and mutations over events
///
/// This is the only place that hands domain events to the publisher. Events
/// are built from the post-mutation record and published once, and only
/// after the store call succeeded.
pub struct EventService {
    store: Arc<dyn EventStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    #[instrument(skip(self))]
    pub async fn list_events(&self) -> Result<Vec<EventRecord>, AppError> {
        let events = self.store.find_many_events().await?;
        debug!(event_count = events.len(), "Events listed");
        Ok(events)
    }

    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: &str) -> Result<EventRecord, AppError> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// Adds the user to the event and broadcasts the change
    #[instrument(skip(self))]
    pub async fn join_event(
        &self,
        user_id: Option<String>,
        event_id: &str,
    ) -> Result<EventRecord, AppError> {
        let user_id = user_id.ok_or_else(|| {
            warn!(event_id = %event_id, "Join attempted without authentication");
            AppError::NotAuthenticated
        })?;

        let user = find_user_summary(self.store.as_ref(), &user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let updated_event = self
            .store
            .attach_attendee(event_id, &user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let attendee_count = updated_event.attendee_count();
        let domain_events = [
            DomainEvent::EventUpdated {
                event: updated_event.clone(),
            },
            DomainEvent::UserJoinedEvent {
                event_id: GroupId::from(event_id),
                user,
                attendee_count,
            },
        ];

        for event in &domain_events {
            let report = self.publisher.publish(event);
            if report.failed() > 0 {
                debug!(
                    event = event.kind(),
                    failed = report.failed(),
                    "Some deliveries failed; mutation still succeeds"
                );
            }
        }

        info!(
            user_id = %user_id,
            event_id = %event_id,
            attendee_count,
            "User joined event"
        );
        Ok(updated_event)
    }
}
