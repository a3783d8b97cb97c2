use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::models::{EventModel, EventRecord, NewEvent, NewUser, UserModel, UserSummary};
use crate::shared::AppError;

/// Data access for users, events and attendance
///
/// Every method returns a plain record or `None` when the referenced row is
/// absent. Implementations never retry internally.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn count_users(&self) -> Result<i64, AppError>;
    async fn create_user(&self, user: NewUser) -> Result<UserModel, AppError>;

    async fn find_event(&self, event_id: &str) -> Result<Option<EventRecord>, AppError>;
    async fn find_many_events(&self) -> Result<Vec<EventRecord>, AppError>;
    async fn find_events_by_attendee(&self, user_id: &str) -> Result<Vec<EventRecord>, AppError>;
    async fn count_events(&self) -> Result<i64, AppError>;
    async fn create_events(&self, events: Vec<NewEvent>) -> Result<u64, AppError>;

    /// Adds the user to the event's attendees and returns the updated event
    ///
    /// Returns `None` when the event does not exist. Attaching a user that
    /// already attends is a no-op that still returns the event.
    async fn attach_attendee(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Option<EventRecord>, AppError>;
}

#[derive(Default)]
struct StoreState {
    users: HashMap<String, UserModel>,
    events: Vec<EventModel>,                 // insertion order
    attendance: HashMap<String, Vec<String>>, // event_id -> user ids in join order
}

impl StoreState {
    fn record_for(&self, event: &EventModel) -> EventRecord {
        let attendees = self
            .attendance
            .get(&event.id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.users.get(id))
                    .map(UserModel::summary)
                    .collect()
            })
            .unwrap_or_default();

        event.clone().with_attendees(attendees)
    }
}

/// In-memory implementation of EventStore for development and testing
///
/// Data is lost when the process exits.
pub struct InMemoryEventStore {
    state: Mutex<StoreState>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, AppError> {
        self.state.lock().map_err(|_| {
            warn!("In-memory store lock poisoned");
            AppError::DatabaseError("store lock poisoned".to_string())
        })
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[instrument(skip(self))]
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let state = self.state()?;
        Ok(state.users.get(user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let state = self.state()?;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        Ok(self.state()?.users.len() as i64)
    }

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: NewUser) -> Result<UserModel, AppError> {
        let mut state = self.state()?;
        if state.users.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "User with email already exists in memory");
            return Err(AppError::DatabaseError(
                "User with this email already exists".to_string(),
            ));
        }

        let model = UserModel::new(user.name, user.email, user.password_hash);
        state.users.insert(model.id.clone(), model.clone());

        debug!(user_id = %model.id, "User created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_event(&self, event_id: &str) -> Result<Option<EventRecord>, AppError> {
        let state = self.state()?;
        Ok(state
            .events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| state.record_for(e)))
    }

    #[instrument(skip(self))]
    async fn find_many_events(&self) -> Result<Vec<EventRecord>, AppError> {
        let state = self.state()?;
        Ok(state.events.iter().map(|e| state.record_for(e)).collect())
    }

    #[instrument(skip(self))]
    async fn find_events_by_attendee(&self, user_id: &str) -> Result<Vec<EventRecord>, AppError> {
        let state = self.state()?;
        Ok(state
            .events
            .iter()
            .filter(|e| {
                state
                    .attendance
                    .get(&e.id)
                    .is_some_and(|ids| ids.iter().any(|id| id == user_id))
            })
            .map(|e| state.record_for(e))
            .collect())
    }

    async fn count_events(&self) -> Result<i64, AppError> {
        Ok(self.state()?.events.len() as i64)
    }

    #[instrument(skip(self, events))]
    async fn create_events(&self, events: Vec<NewEvent>) -> Result<u64, AppError> {
        let mut state = self.state()?;
        let count = events.len() as u64;
        state.events.extend(events.into_iter().map(EventModel::new));

        debug!(created = count, "Events created in memory");
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn attach_attendee(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Option<EventRecord>, AppError> {
        let mut state = self.state()?;

        let Some(event) = state.events.iter().find(|e| e.id == event_id).cloned() else {
            debug!(event_id = %event_id, "Event not found for attach");
            return Ok(None);
        };

        if !state.users.contains_key(user_id) {
            warn!(user_id = %user_id, "Cannot attach unknown user");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let attendees = state.attendance.entry(event_id.to_string()).or_default();
        if attendees.iter().any(|id| id == user_id) {
            debug!(event_id = %event_id, user_id = %user_id, "User already attends event");
        } else {
            attendees.push(user_id.to_string());
            info!(
                event_id = %event_id,
                user_id = %user_id,
                attendee_count = attendees.len(),
                "Attendee attached in memory"
            );
        }

        Ok(Some(state.record_for(&event)))
    }
}

/// Convenience used by services that only need the public user fields
pub async fn find_user_summary(
    store: &dyn EventStore,
    user_id: &str,
) -> Result<Option<UserSummary>, AppError> {
    Ok(store.find_user(user_id).await?.map(|u| u.summary()))
}
