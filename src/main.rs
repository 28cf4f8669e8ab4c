use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use galleria::account::repository::{InMemoryUserRepository, PostgresUserRepository};
use galleria::auth::repository::{
    InMemoryRevokedTokenRepository, PostgresRevokedTokenRepository,
};
use galleria::auth::TokenConfig;
use galleria::gallery::repository::{
    InMemoryGalleryRepository, InMemoryMediaRepository, PostgresGalleryRepository,
    PostgresMediaRepository,
};
use galleria::routes::create_router;
use galleria::shared::AppState;
use galleria::storage::LocalMediaStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galleria=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting media gallery server");

    let media_root =
        PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()));
    let media_store = Arc::new(LocalMediaStore::new(media_root.clone()));
    let token_config = TokenConfig::new();

    // In-memory repositories by default; point DATABASE_URL at Postgres
    // for persistent storage.
    let app_state = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            info!("Using PostgreSQL repositories");
            AppState::new(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresRevokedTokenRepository::new(pool.clone())),
                Arc::new(PostgresGalleryRepository::new(pool.clone())),
                Arc::new(PostgresMediaRepository::new(pool)),
                media_store,
                media_root,
                token_config,
            )
        }
        Err(_) => {
            info!("Using in-memory repositories");
            AppState::new(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryRevokedTokenRepository::new()),
                Arc::new(InMemoryGalleryRepository::new()),
                Arc::new(InMemoryMediaRepository::new()),
                media_store,
                media_root,
                token_config,
            )
        }
    };

    let app = create_router(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await.unwrap();
}
