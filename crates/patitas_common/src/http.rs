// --- File: crates/patitas_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, PatitasError};

// Include the client module
pub mod client;

/// Extension trait for PatitasError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for PatitasError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_message = self.to_string();

        let body = Json(json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

/// Implement IntoResponse for PatitasError to make it easier to use in Axum handlers.
impl IntoResponse for PatitasError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// A utility function to convert a Result<Json<T>, PatitasError> to a Result<Json<T>, Response>.
/// This is useful for Axum handlers that return a JSON response.
pub fn handle_json_result<T>(result: Result<T, PatitasError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

/// Header carrying the authenticated user id, set by the front-end proxy
/// after it has verified the bearer credential.
pub const CALLER_ID_HEADER: &str = "x-user-id";

/// Extract the caller's user id from the request headers.
///
/// Returns `None` when the header is absent or empty; workflows treat that
/// as an unauthenticated call. No verification happens here; identity is an
/// upstream collaborator.
pub fn caller_id(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(CALLER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
