use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;
use waypoint_core::MirrorError;
use waypoint_shortener::ShortenerError;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Forbidden(String),
    Shortener(ShortenerError),
    Mirror(MirrorError),
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        Self::Shortener(value)
    }
}

impl From<MirrorError> for AppError {
    fn from(value: MirrorError) -> Self {
        Self::Mirror(value)
    }
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            AppError::Shortener(ShortenerError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Shortener(err @ ShortenerError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Shortener(ShortenerError::Storage(err)) => {
                error!(error = %err, "record store failure");
                if err.is_transient() {
                    unavailable()
                } else {
                    internal()
                }
            }
            AppError::Mirror(err) => {
                error!(error = %err, "mirror failure");
                if err.is_transient() {
                    unavailable()
                } else {
                    internal()
                }
            }
        }
    }
}

fn unavailable() -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Service temporarily unavailable.".to_string(),
    )
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error.".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}
