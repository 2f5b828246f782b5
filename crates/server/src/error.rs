use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use store::StorageError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Storage(StorageError::Closed | StorageError::Unavailable(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "StoreUnavailable")
            }
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "StorageError"),
        };

        tracing::error!("Request failed: {}", self);
        let error_message = format!("{}: {}", error_type, self);
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
