use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    config::{AppConfig, MediaConfig},
    database,
    error::{AppError, Result},
    repositories::{
        PgProductRepository, PgSessionStore, PgUserStore, ProductRepository, SessionStore,
        UserStore,
    },
    routes,
};

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub media: MediaConfig,
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;
    let state = AppState {
        products: Arc::new(PgProductRepository::new(pool.clone())),
        users: Arc::new(PgUserStore::new(pool.clone())),
        sessions: Arc::new(PgSessionStore::new(pool)),
        media: config.media.clone(),
    };

    tokio::fs::create_dir_all(&config.media.root).await?;

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::ConfigError(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::header::AUTHORIZATION,
            HeaderName::from_static("x-csrftoken"),
        ])
        .allow_credentials(true)
        .allow_origin(allowed_origins);

    let media_files = ServeDir::new(&config.media.root);
    let router = match config.media.url.trim_end_matches('/') {
        "" => routes::create_router().fallback_service(media_files),
        mount => routes::create_router().nest_service(mount, media_files),
    };

    let app = router
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
