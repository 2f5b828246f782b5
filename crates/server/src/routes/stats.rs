use axum::{Router, extract::State, response::Json, routing::get};
use store::models::{MessagesPerSecond, RankedEntry};

use crate::{AppState, error::ApiError};

pub fn router() -> Router<AppState> {
    let stats_router = Router::new()
        .route("/", get(get_messages_per_second))
        .route("/words", get(get_top_words))
        .route("/nicks", get(get_top_nicks))
        .route("/rooms", get(get_top_rooms))
        .route("/failedMessages", get(get_failed_messages));

    Router::new().nest("/stats", stats_router)
}

pub async fn get_messages_per_second(
    State(state): State<AppState>,
) -> Result<Json<MessagesPerSecond>, ApiError> {
    Ok(Json(state.reader.messages_per_second().await?))
}

pub async fn get_top_words(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedEntry>>, ApiError> {
    Ok(Json(state.reader.top_words().await?))
}

pub async fn get_top_nicks(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedEntry>>, ApiError> {
    Ok(Json(state.reader.top_nicks().await?))
}

pub async fn get_top_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedEntry>>, ApiError> {
    Ok(Json(state.reader.top_rooms().await?))
}

pub async fn get_failed_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.reader.failed_messages().await?))
}
