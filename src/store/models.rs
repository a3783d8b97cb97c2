use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: String, // UUID v4 as string
    pub name: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, never serialized
}

impl UserModel {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
        }
    }

    /// Public view of the user, safe to send to clients
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// User fields exposed over the API and in broadcast payloads
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Database model for the events table (without attendees)
#[derive(Debug, Clone, FromRow)]
pub struct EventModel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
}

impl EventModel {
    pub fn new(event: NewEvent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: event.name,
            location: event.location,
            start_time: event.start_time,
        }
    }

    pub fn with_attendees(self, attendees: Vec<UserSummary>) -> EventRecord {
        EventRecord {
            id: self.id,
            name: self.name,
            location: self.location,
            start_time: self.start_time,
            attendees,
        }
    }
}

/// Fields required to create an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
}

/// An event together with its current attendee list
///
/// This is the record returned by queries and carried in `eventUpdated`
/// broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub attendees: Vec<UserSummary>,
}

impl EventRecord {
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }
}
