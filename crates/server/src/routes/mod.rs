use axum::{Router, routing::get};

use crate::AppState;

pub mod health;
pub mod stats;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/healthcheck", get(health::health_check))
        .merge(stats::router())
        .with_state(state)
}
