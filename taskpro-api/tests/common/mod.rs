#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database and Redis setup
/// - A verified test user with a live session
/// - Request helpers against the in-process router
///
/// Requires DATABASE_URL, REDIS_URL and JWT_SECRET (or a .env file).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use taskpro_api::app::{build_router, AppState};
use taskpro_api::config::Config;
use taskpro_shared::assets::DisabledAssetStore;
use taskpro_shared::db::migrations::run_migrations;
use taskpro_shared::identity::{LoginCredentials, Registration};
use taskpro_shared::mail::LogMailer;
use taskpro_shared::models::user::User;
use taskpro_shared::redis::{RedisClient, RedisConfig};
use tower::Service as _;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "secret123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub state: AppState,
    pub app: axum::Router,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a context with a verified, logged-in user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let redis = RedisClient::new(RedisConfig::new(config.redis.url.clone())).await?;

        let state = AppState::new(
            db.clone(),
            redis,
            config,
            Arc::new(LogMailer),
            Arc::new(DisabledAssetStore),
        );
        let app = build_router(state.clone());

        let email = unique_email();
        state
            .identity
            .register(Registration {
                email: email.clone(),
                password: TEST_PASSWORD.to_string(),
                name: "Test User".to_string(),
            })
            .await?;

        let pending = User::find_by_email(&db, &email)
            .await?
            .and_then(|u| u.verification_token)
            .ok_or_else(|| anyhow::anyhow!("verification token missing"))?;
        state.identity.verify(&pending).await?;

        let outcome = state
            .identity
            .authenticate(LoginCredentials {
                email: email.clone(),
                password: TEST_PASSWORD.to_string(),
            })
            .await?;

        let user = User::find_by_email(&db, &email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user missing"))?;

        Ok(TestContext {
            db,
            state,
            app,
            user,
            token: outcome.token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Sends a request with the session header and an optional JSON body
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", self.auth_header());

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        send_request(&self.app, builder.body(body).unwrap()).await
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Boards, columns and cards cascade
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Unique email so tests don't collide
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

/// Runs a request through the router and decodes the body (Null when empty)
pub async fn send_request(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
        })
    };

    (status, json)
}

/// Builds an unauthenticated JSON request
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
