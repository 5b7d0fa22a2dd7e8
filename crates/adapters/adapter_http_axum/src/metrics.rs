//! Prometheus scrape endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

use quotaswitch_app::ports::MetricsExporter;

use crate::state::AppState;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// `GET /metrics`: every counter in the Prometheus text format.
pub async fn export<B, M>(State(state): State<AppState<B, M>>) -> Response
where
    B: Send + Sync + 'static,
    M: MetricsExporter + Clone + Send + Sync + 'static,
{
    match state.metrics.export_text() {
        Ok(text) => (StatusCode::OK, [(CONTENT_TYPE, TEXT_FORMAT)], text).into_response(),
        Err(err) => {
            tracing::error!(error = ?err, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode metrics: {err}"),
            )
                .into_response()
        }
    }
}
