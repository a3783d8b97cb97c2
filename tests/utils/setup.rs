use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt; // for `oneshot`

use rsvp_fanout::{
    build_router,
    fanout::ConnectionRegistry,
    session::TokenConfig,
    store::{seed, seed_database, EventRecord, EventStore, InMemoryEventStore, NewUser},
    AppState,
};

use super::clients::TestClient;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub store: Arc<InMemoryEventStore>,
    pub clients: Vec<TestClient>,
    pub events: Vec<EventRecord>,
}

pub struct TestSetupBuilder {
    client_count: usize,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { client_count: 0 }
    }

    pub fn with_clients(mut self, count: usize) -> Self {
        self.client_count = count;
        self
    }

    pub async fn build(self) -> TestSetup {
        let store = Arc::new(InMemoryEventStore::new());
        seed_database(store.as_ref()).await;
        let events = store.find_many_events().await.unwrap();

        let state = AppState::new(store.clone(), TokenConfig::new("test-secret", 24));
        let clients = (0..self.client_count)
            .map(|_| TestClient::connect(&state.registry))
            .collect();

        TestSetup {
            state,
            store,
            clients,
            events,
        }
    }
}

#[allow(dead_code)]
impl TestSetup {
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.state.registry
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn event_id(&self, index: usize) -> String {
        self.events[index].id.clone()
    }

    /// Creates a user with a known password and returns its id
    pub async fn create_user(&self, name: &str, password: &str) -> String {
        self.store
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: rsvp_fanout::session::hash_password(password).unwrap(),
            })
            .await
            .unwrap()
            .id
    }

    /// Logs in through the HTTP surface and returns the bearer token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({ "email": email, "password": password }).to_string();
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = self.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "login should succeed");

        let json = body_json(response).await;
        json["token"].as_str().unwrap().to_string()
    }

    pub async fn login_admin(&self) -> String {
        self.login(seed::ADMIN_EMAIL, seed::ADMIN_PASSWORD).await
    }

    /// Calls the join endpoint; returns the status and JSON body
    pub async fn join_event(
        &self,
        event_id: &str,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(format!("/events/{}/join", event_id));
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = self
            .router()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }
}

#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
