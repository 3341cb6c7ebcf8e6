/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskpro_api::{app::AppState, config::Config};
/// use taskpro_shared::assets::DisabledAssetStore;
/// use taskpro_shared::mail::LogMailer;
/// use taskpro_shared::redis::{RedisClient, RedisConfig};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let redis = RedisClient::new(RedisConfig::new(&config.redis.url)).await?;
/// let state = AppState::new(pool, redis, config, Arc::new(LogMailer), Arc::new(DisabledAssetStore));
/// let app = taskpro_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use taskpro_shared::assets::AssetStore;
use taskpro_shared::auth::{middleware::authenticate, revocation::RevocationList, session::SessionManager};
use taskpro_shared::hierarchy::Hierarchy;
use taskpro_shared::identity::{IdentityConfig, IdentityService};
use taskpro_shared::mail::Mailer;
use taskpro_shared::redis::RedisClient;
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Redis client (revocation list, health check)
    pub redis: RedisClient,

    /// Application configuration
    pub config: Arc<Config>,

    /// Accounts and sessions
    pub identity: IdentityService,

    /// Boards, columns and cards
    pub hierarchy: Hierarchy,
}

impl AppState {
    /// Wires the services from their collaborators
    pub fn new(
        db: PgPool,
        redis: RedisClient,
        config: Config,
        mailer: Arc<dyn Mailer>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let sessions = SessionManager::new(
            config.jwt.secret.clone(),
            chrono::Duration::seconds(config.jwt.session_ttl_seconds),
            RevocationList::new(redis.clone()),
        );

        let identity = IdentityService::new(
            db.clone(),
            sessions,
            mailer,
            assets,
            IdentityConfig {
                public_base_url: config.identity.public_base_url.clone(),
                default_avatar_url: config.identity.default_avatar_url.clone(),
            },
        );

        Self {
            hierarchy: Hierarchy::new(db.clone()),
            identity,
            db,
            redis,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /auth/                       # Token in header where needed
///     │   ├── POST /signup
///     │   ├── POST /login
///     │   ├── POST /logout
///     │   ├── GET  /verify/:token
///     │   └── POST /verify             # Resend verification mail
///     ├── /users/current               # GET, PATCH (multipart)
///     ├── /backgrounds                 # GET (public)
///     ├── /boards                      # JWT
///     │   ├── GET, POST /
///     │   ├── GET, PATCH, DELETE /:id
///     │   └── POST /:id/columns
///     ├── /columns                     # JWT
///     │   ├── PATCH, DELETE /:id
///     │   ├── PATCH /:id/position
///     │   └── POST /:id/cards
///     └── /cards                       # JWT
///         ├── PATCH, DELETE /:id
///         └── PATCH /:id/move/:column_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (board, column and card routes)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Account routes resolve the session themselves
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/verify/:token", get(routes::auth::verify_email))
        .route("/verify", post(routes::auth::resend_verification));

    let user_routes = Router::new().route(
        "/current",
        get(routes::users::current_user).patch(routes::users::update_current_user),
    );

    let board_routes = Router::new()
        .route(
            "/",
            get(routes::boards::list_boards).post(routes::boards::create_board),
        )
        .route(
            "/:id",
            get(routes::boards::get_board)
                .patch(routes::boards::update_board)
                .delete(routes::boards::delete_board),
        )
        .route("/:id/columns", post(routes::columns::create_column))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let column_routes = Router::new()
        .route(
            "/:id",
            patch(routes::columns::update_column).delete(routes::columns::delete_column),
        )
        .route("/:id/position", patch(routes::columns::reorder_column))
        .route("/:id/cards", post(routes::cards::create_card))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let card_routes = Router::new()
        .route(
            "/:id",
            patch(routes::cards::update_card).delete(routes::cards::delete_card),
        )
        .route("/:id/move/:column_id", patch(routes::cards::move_card))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .route("/backgrounds", get(routes::backgrounds::list_backgrounds))
        .nest("/boards", board_routes)
        .nest("/columns", column_routes)
        .nest("/cards", card_routes);

    let cors = cors_layer(&state.config.api.cors_origins);

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS policy: permissive for `*`, otherwise an explicit origin list
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// JWT authentication middleware layer
///
/// Validates the bearer token (signature, expiry, revocation) and injects the
/// resulting `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(state.identity.sessions(), req.headers()).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_explicit_origins() {
        // Invalid header values are skipped rather than panicking
        let _ = cors_layer(&["https://taskpro.example".to_string(), "bad\norigin".to_string()]);
        let _ = cors_layer(&["*".to_string()]);
    }
}
