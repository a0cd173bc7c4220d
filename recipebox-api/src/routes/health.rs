/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "connections": { "total": 3, "idle": 2 }
/// }
/// ```
///
/// Always answers 200; a failed database check shows up as
/// `"status": "degraded"`.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use recipebox_shared::db::pool::{get_pool_stats, health_check as check_database};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,

    pub connections: ConnectionStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionStats {
    pub total: usize,
    pub idle: usize,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match check_database(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let stats = get_pool_stats(&state.db);

    Ok(Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        connections: ConnectionStats {
            total: stats.total_connections,
            idle: stats.idle_connections,
        },
    }))
}
