//! JSON control API handler modules.

pub mod service;

use axum::Router;
use axum::routing::get;

use quotaswitch_app::ports::{FirewallBackend, MetricsRecorder};

use crate::state::AppState;

/// Build the `/api/v1` sub-router.
pub fn routes<B, M>() -> Router<AppState<B, M>>
where
    B: FirewallBackend + Send + Sync + 'static,
    M: MetricsRecorder + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/service/on", get(service::on::<B, M>))
        .route("/service/off", get(service::off::<B, M>))
        .route("/service/limitfill", get(service::limit_fill::<B, M>))
        .route("/service/status", get(service::status::<B, M>))
}
