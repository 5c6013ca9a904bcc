use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Database,
    Redis,
    Unauthorized,
    Forbidden(&'static str),
    NotFound(&'static str),
    Invalid(String),
    /// Spin attempted inside the cooldown window. Carries the remaining
    /// seconds so clients can arm their countdown instead of treating this
    /// as a retryable failure.
    Cooldown { seconds: i64 },
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {}", err);
        ApiError::Database
    }
}

impl From<redis::RedisError> for ApiError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!("redis error: {}", err);
        ApiError::Redis
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Invalid(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Database => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Database error" }),
            ),
            ApiError::Redis => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Cache error" }),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized" }),
            ),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, json!({ "error": message })),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::Cooldown { seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": shared::spin_wheel::cooldown_message(seconds),
                    "cooldown_seconds": seconds,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
