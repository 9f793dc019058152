//! Mapping of store and rendering failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use replog_core::Error;

/// Failure of an HTML route
///
/// `context` names the action that failed and doubles as the response body
/// for server errors, so internal details never reach the client.
#[derive(Debug)]
pub struct PageError {
    context: &'static str,
    error: Error,
}

impl PageError {
    pub fn new(context: &'static str, error: Error) -> Self {
        Self { context, error }
    }

    /// Adapter for `map_err`
    pub fn context(context: &'static str) -> impl FnOnce(Error) -> Self {
        move |error| Self::new(context, error)
    }

    pub fn status_code(&self) -> StatusCode {
        status_for(&self.error)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self.error {
            Error::Validation(reason) => format!("{}: {}", self.context, reason),
            Error::NotFound(_) => "Entry not found".to_string(),
            _ => self.context.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.error, "{}", self.context);
        } else {
            tracing::warn!(error = %self.error, status = status.as_u16(), "{}", self.context);
        }

        (status, body).into_response()
    }
}

/// Failure of the JSON feed; always a generic error body
#[derive(Debug)]
pub struct ApiError(pub Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "JSON feed failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Server error" })),
        )
            .into_response()
    }
}

/// HTTP status for a core error
///
/// - Validation: 422 Unprocessable Entity
/// - NotFound: 404 Not Found
/// - everything else: 500 Internal Server Error
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replog_core::ValidationError;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            status_for(&Error::Validation(ValidationError::MissingField("exercise"))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&Error::NotFound("abc".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&Error::Store("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_page_error_does_not_leak_details() {
        let error = PageError::new(
            "Error loading entry",
            Error::Store("/home/user/.local/share/replog is corrupt".into()),
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_is_500() {
        let response = ApiError(Error::Store("unreachable".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
