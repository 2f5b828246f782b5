use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RootStatus {
    pub status: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Ready,
    Down,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub server_timestamp: DateTime<Utc>,
    pub status: &'static str,
    pub redis_status: StoreStatus,
}

pub async fn root() -> Json<RootStatus> {
    Json(RootStatus { status: true })
}

/// Always answers; a failing store only flips `redisStatus`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    let redis_status = match state.store().ping().await {
        Ok(()) => StoreStatus::Ready,
        Err(e) => {
            tracing::warn!("Store ping failed: {}", e);
            StoreStatus::Down
        }
    };

    Json(HealthReport {
        server_timestamp: Utc::now(),
        status: "ok",
        redis_status,
    })
}
