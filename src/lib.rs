pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use services::media::{MediaStorage, MEDIA_URL_PREFIX};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub media: MediaStorage,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        tracing::info!("Database connected");

        db.run_migrations().await?;

        Ok(Self::with_database(config, db))
    }

    /// Состояние поверх уже готового пула (тесты, ленивые подключения).
    pub fn with_database(config: config::Config, db: database::Database) -> Arc<Self> {
        let media = MediaStorage::new(config.media.root.clone());
        Arc::new(Self { db, config, media })
    }
}

/// Собирает весь HTTP-интерфейс: API, раздачу картинок и служебные ручки.
pub fn app(state: Arc<AppState>) -> Router {
    let media = ServeDir::new(state.media.root());

    Router::new()
        .route("/", get(|| async { "Airport API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes(state.config.media.max_upload_bytes))
        .nest_service(MEDIA_URL_PREFIX, media)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
