use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Builds the uniform `{"error": "..."}` failure body. Server-side errors are
/// masked so internals never leak to the client.
pub fn error_response(status: StatusCode, err: impl std::fmt::Display) -> Response {
    let error = if status.is_server_error() {
        "Internal server error".to_string()
    } else {
        err.to_string()
    };

    (status, Json(ErrorResponse { error })).into_response()
}
