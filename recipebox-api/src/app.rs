/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use recipebox_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = recipebox_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::auth::token_auth_layer,
    routes::{attributes, health, recipes, user},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use recipebox_shared::{
    models::{ingredient::Ingredient, tag::Tag},
    storage::MediaStorage,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Uploaded image storage
    pub media: MediaStorage,
}

impl AppState {
    /// Creates new application state; media storage follows `config.media`
    pub fn new(db: PgPool, config: Config) -> Self {
        let media = MediaStorage::new(config.media.root.clone(), config.media.url.clone());
        Self {
            db,
            config: Arc::new(config),
            media,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                  # Health check (public)
/// ├── /media/*                                 # Uploaded files (public)
/// ├── /api/user/
/// │   ├── POST /create/                        # Register (public)
/// │   ├── POST /token/                         # Issue token (public)
/// │   └── GET|PUT|PATCH /me/                   # Own profile
/// └── /api/recipe/
///     ├── GET|POST /tags/                      # List / create
///     ├── PUT|PATCH|DELETE /tags/:id/
///     ├── GET|POST /ingredients/
///     ├── PUT|PATCH|DELETE /ingredients/:id/
///     ├── GET|POST /recipes/
///     ├── GET|PUT|PATCH|DELETE /recipes/:id/
///     └── POST /recipes/:id/upload-image/
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Token authentication (everything except health, media and the public
///    user routes)
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/user/create/", post(user::create_user))
        .route("/api/user/token/", post(user::create_token));

    let upload_limit = DefaultBodyLimit::max(state.config.media.max_upload_bytes);

    let protected_routes = Router::new()
        .route(
            "/api/user/me/",
            get(user::retrieve_me)
                .put(user::update_me)
                .patch(user::partial_update_me),
        )
        .route(
            "/api/recipe/tags/",
            get(attributes::list::<Tag>).post(attributes::create::<Tag>),
        )
        .route(
            "/api/recipe/tags/:id/",
            put(attributes::update::<Tag>)
                .patch(attributes::partial_update::<Tag>)
                .delete(attributes::destroy::<Tag>),
        )
        .route(
            "/api/recipe/ingredients/",
            get(attributes::list::<Ingredient>).post(attributes::create::<Ingredient>),
        )
        .route(
            "/api/recipe/ingredients/:id/",
            put(attributes::update::<Ingredient>)
                .patch(attributes::partial_update::<Ingredient>)
                .delete(attributes::destroy::<Ingredient>),
        )
        .route(
            "/api/recipe/recipes/",
            get(recipes::list).post(recipes::create),
        )
        .route(
            "/api/recipe/recipes/:id/",
            get(recipes::retrieve)
                .put(recipes::update)
                .patch(recipes::partial_update)
                .delete(recipes::destroy),
        )
        .route(
            "/api/recipe/recipes/:id/upload-image/",
            post(recipes::upload_image).layer(upload_limit),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let media = ServeDir::new(state.config.media.root.clone());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(&state.config.media.mount_path(), media)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// Permissive CORS for `*`, otherwise only the listed origins
fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
