//! API response helpers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::engine::EnrollError;

/// A JSON error payload with an attached status code.
///
/// Lookup failures map to 404; every validation conflict maps to 409 with a
/// machine-readable code, so a front end can branch on `code` (e.g. to offer
/// the waitlist after `no_vacancy`) without parsing messages.
pub struct ApiErrorType {
    status: StatusCode,
    error: String,
    code: &'static str,
    waitlist_available: bool,
}

impl From<&EnrollError> for ApiErrorType {
    fn from(err: &EnrollError) -> Self {
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::CONFLICT
        };
        Self {
            status,
            error: err.to_string(),
            code: err.code(),
            waitlist_available: err.suggests_waitlist(),
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "code": self.code,
            "waitlist_available": self.waitlist_available,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Converts a typed engine error to an API response.
pub fn enroll_error_response(err: &EnrollError) -> Response {
    ApiErrorType::from(err).into_response()
}
