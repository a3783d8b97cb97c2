use chrono::{DateTime, TimeZone, Utc};
use tracing::{error, info, instrument};

use super::models::{NewEvent, NewUser};
use super::repository::EventStore;
use crate::session::hash_password;
use crate::shared::AppError;

pub const ADMIN_NAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@gmail.com";
pub const ADMIN_PASSWORD: &str = "admin@12345";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// The sample events created on first start
pub fn sample_events() -> Vec<NewEvent> {
    [
        ("India Tech Summit", "Bangalore, India", at(2025, 9, 12, 9, 0)),
        ("Diwali Celebration", "Mumbai, India", at(2025, 10, 20, 18, 30)),
        ("Startup Pitch Event", "Delhi, India", at(2025, 8, 5, 14, 0)),
        ("AI & Machine Learning Conference", "Hyderabad, India", at(2025, 7, 15, 10, 0)),
        ("Digital Marketing Workshop", "Chennai, India", at(2025, 6, 22, 13, 0)),
        ("Blockchain Developer Meetup", "Pune, India", at(2025, 11, 8, 16, 0)),
        ("Web3 Innovation Summit", "Gurgaon, India", at(2025, 5, 18, 11, 30)),
        ("Cyber Security Conference", "Kolkata, India", at(2025, 12, 3, 9, 30)),
    ]
    .into_iter()
    .map(|(name, location, start_time)| NewEvent {
        name: name.to_string(),
        location: location.to_string(),
        start_time,
    })
    .collect()
}

async fn try_seed(store: &dyn EventStore) -> Result<(), AppError> {
    if store.count_users().await? == 0 {
        let admin = store
            .create_user(NewUser {
                name: ADMIN_NAME.to_string(),
                email: ADMIN_EMAIL.to_string(),
                password_hash: hash_password(ADMIN_PASSWORD)?,
            })
            .await?;
        info!(user_id = %admin.id, "Created admin user");
    }

    if store.count_events().await? == 0 {
        let created = store.create_events(sample_events()).await?;
        info!(created, "Database seeded with initial events");
    }

    Ok(())
}

/// Creates the admin user and sample events when the store is empty
///
/// Failures are logged and swallowed so the server still starts.
#[instrument(skip(store))]
pub async fn seed_database(store: &dyn EventStore) {
    match try_seed(store).await {
        Ok(()) => info!("Database seeding complete"),
        Err(e) => error!(error = %e, "Error seeding database"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::verify_password;
    use crate::store::InMemoryEventStore;

    #[tokio::test]
    async fn test_seed_populates_empty_store() {
        let store = InMemoryEventStore::new();
        seed_database(&store).await;

        assert_eq!(store.count_users().await.unwrap(), 1);
        assert_eq!(store.count_events().await.unwrap(), 8);

        let admin = store.find_user_by_email(ADMIN_EMAIL).await.unwrap().unwrap();
        assert!(verify_password(ADMIN_PASSWORD, &admin.password_hash));
    }

    #[tokio::test]
    async fn test_seed_is_skipped_when_data_exists() {
        let store = InMemoryEventStore::new();
        seed_database(&store).await;
        seed_database(&store).await;

        assert_eq!(store.count_users().await.unwrap(), 1);
        assert_eq!(store.count_events().await.unwrap(), 8);
    }
}
