/// Health check endpoint
///
/// Provides a simple health check endpoint that verifies:
/// - The server is running
/// - Database connectivity
/// - Redis connectivity (session revocation depends on it)
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "success",
///   "code": 200,
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "database": "connected",
///     "redis": "connected"
///   }
/// }
/// ```

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use taskpro_shared::db::pool::health_check as database_health;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Redis status
    pub redis: String,
}

fn connection_status(connected: bool) -> &'static str {
    if connected {
        "connected"
    } else {
        "disconnected"
    }
}

/// Health check handler
///
/// Degraded dependencies are reported in the body; the status is always 200.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<ApiResponse<HealthResponse>> {
    let database_ok = database_health(&state.db).await.is_ok();
    let redis_ok = matches!(state.redis.ping().await, Ok(true));

    if !database_ok || !redis_ok {
        tracing::warn!(database_ok, redis_ok, "Health check degraded");
    }

    Ok(ApiResponse::ok(HealthResponse {
        status: if database_ok && redis_ok {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: connection_status(database_ok).to_string(),
        redis: connection_status(redis_ok).to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_status() {
        assert_eq!(connection_status(true), "connected");
        assert_eq!(connection_status(false), "disconnected");
    }
}
