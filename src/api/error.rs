use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Error body for every 4xx/5xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub status_code: u16,
    pub message: String,
    pub is_error: bool,
}

/// What a client gets to see when a request fails.
///
/// The messages are fixed. Details stay in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Use integer for the id parameter")]
    InvalidId,
    #[error("Song is not valid")]
    InvalidSong,
    #[error("Request is not valid")]
    InvalidRequest,
    #[error("Song not found")]
    SongNotFound,
    #[error("Not found")]
    RouteNotFound,
    #[error("Error with database. Please Try later")]
    DatabaseUnavailable,
    #[error("Internal server error")]
    Internal,
    #[error("Internal error. Try again later")]
    Upstream,
    #[error("Request timed out")]
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId | ApiError::InvalidSong | ApiError::InvalidRequest => {
                StatusCode::BAD_REQUEST
            }
            ApiError::SongNotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::DatabaseUnavailable | ApiError::Internal | ApiError::Upstream => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Message {
            status_code: status.as_u16(),
            message: self.to_string(),
            is_error: true,
        };
        (status, Json(body)).into_response()
    }
}
