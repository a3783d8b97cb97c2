use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rsvp_fanout::{
    build_router,
    store::{seed_database, EventStore, InMemoryEventStore, PostgresEventStore},
    AppState, ServerConfig,
};

async fn build_store(config: &ServerConfig) -> Result<Arc<dyn EventStore>, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(database_url) => {
            info!("Connecting to PostgreSQL");
            let pool = sqlx::PgPool::connect(database_url).await?;
            let store = PostgresEventStore::new(pool);
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory store");
            Ok(Arc::new(InMemoryEventStore::new()))
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();

    let store = build_store(&config).await?;
    if config.seed_database {
        seed_database(store.as_ref()).await;
    }

    let app_state = AppState::new(store, config.token_config());
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    info!("WebSocket endpoint at ws://localhost:{}/ws", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsvp_fanout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting event RSVP server");

    if let Err(e) = run().await {
        error!(error = %e, "Error starting server");
        std::process::exit(1);
    }
}
