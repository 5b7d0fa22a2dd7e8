//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use quotaswitch_domain::error::QuotaSwitchError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`QuotaSwitchError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(QuotaSwitchError);

impl From<QuotaSwitchError> for ApiError {
    fn from(err: QuotaSwitchError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code this error is reported with.
    ///
    /// Unknown services answer `400` rather than `404`, like malformed names.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            QuotaSwitchError::Validation(_) | QuotaSwitchError::NotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            QuotaSwitchError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            QuotaSwitchError::Configuration(_) | QuotaSwitchError::Backend(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the request named a registered service.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.0, QuotaSwitchError::NotFound(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            QuotaSwitchError::Validation(err) => err.to_string(),
            QuotaSwitchError::Unauthorized(err) => err.to_string(),
            QuotaSwitchError::NotFound(err) => err.to_string(),
            QuotaSwitchError::Configuration(err) => {
                tracing::error!(error = %err, "configuration error");
                err.to_string()
            }
            QuotaSwitchError::Backend(err) => {
                tracing::error!(error = ?err, "backend error");
                "some errors occurred with hetzner api".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
