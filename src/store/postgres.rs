use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::models::{EventModel, EventRecord, NewEvent, NewUser, UserModel, UserSummary};
use super::repository::EventStore;
use crate::shared::AppError;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        location TEXT NOT NULL,
        start_time TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS event_attendees (
        event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        joined_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (event_id, user_id)
    )",
];

/// Attendee row joined with the event it belongs to
#[derive(Debug, FromRow)]
struct AttendeeRow {
    event_id: String,
    id: String,
    name: String,
    email: String,
}

impl From<AttendeeRow> for UserSummary {
    fn from(row: AttendeeRow) -> Self {
        UserSummary {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

fn db_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "Database query failed");
    AppError::DatabaseError(e.to_string())
}

/// PostgreSQL implementation of EventStore
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they do not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }
        info!("Database schema ensured");
        Ok(())
    }

    async fn attendees_for(&self, event_ids: &[String]) -> Result<HashMap<String, Vec<UserSummary>>, AppError> {
        let rows = sqlx::query_as::<_, AttendeeRow>(
            "SELECT a.event_id, u.id, u.name, u.email
             FROM event_attendees a
             JOIN users u ON u.id = a.user_id
             WHERE a.event_id = ANY($1)
             ORDER BY a.joined_at, u.id",
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut by_event: HashMap<String, Vec<UserSummary>> = HashMap::new();
        for row in rows {
            by_event
                .entry(row.event_id.clone())
                .or_default()
                .push(row.into());
        }
        Ok(by_event)
    }

    async fn with_attendees(&self, events: Vec<EventModel>) -> Result<Vec<EventRecord>, AppError> {
        let ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
        let mut attendees = self.attendees_for(&ids).await?;

        Ok(events
            .into_iter()
            .map(|event| {
                let list = attendees.remove(&event.id).unwrap_or_default();
                event.with_attendees(list)
            })
            .collect())
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    #[instrument(skip(self))]
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: NewUser) -> Result<UserModel, AppError> {
        let model = UserModel::new(user.name, user.email, user.password_hash);

        sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)")
            .bind(&model.id)
            .bind(&model.name)
            .bind(&model.email)
            .bind(&model.password_hash)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        debug!(user_id = %model.id, "User created in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_event(&self, event_id: &str) -> Result<Option<EventRecord>, AppError> {
        let event = sqlx::query_as::<_, EventModel>(
            "SELECT id, name, location, start_time FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match event {
            Some(event) => Ok(self.with_attendees(vec![event]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_many_events(&self) -> Result<Vec<EventRecord>, AppError> {
        let events = sqlx::query_as::<_, EventModel>(
            "SELECT id, name, location, start_time FROM events ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        self.with_attendees(events).await
    }

    #[instrument(skip(self))]
    async fn find_events_by_attendee(&self, user_id: &str) -> Result<Vec<EventRecord>, AppError> {
        let events = sqlx::query_as::<_, EventModel>(
            "SELECT e.id, e.name, e.location, e.start_time
             FROM events e
             JOIN event_attendees a ON a.event_id = e.id
             WHERE a.user_id = $1
             ORDER BY e.created_at, e.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        self.with_attendees(events).await
    }

    async fn count_events(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    #[instrument(skip(self, events))]
    async fn create_events(&self, events: Vec<NewEvent>) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut created = 0;

        for event in events.into_iter().map(EventModel::new) {
            created += sqlx::query(
                "INSERT INTO events (id, name, location, start_time) VALUES ($1, $2, $3, $4)",
            )
            .bind(&event.id)
            .bind(&event.name)
            .bind(&event.location)
            .bind(event.start_time)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?
            .rows_affected();
        }

        tx.commit().await.map_err(db_error)?;
        debug!(created, "Events created in database");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn attach_attendee(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Option<EventRecord>, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        if !exists {
            debug!(event_id = %event_id, "Event not found for attach");
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO event_attendees (event_id, user_id) VALUES ($1, $2)
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        info!(event_id = %event_id, user_id = %user_id, "Attendee attached in database");
        self.find_event(event_id).await
    }
}
