//! Shared application state for axum handlers.

use std::sync::Arc;

use quotaswitch_app::services::auth_service::AuthService;
use quotaswitch_app::services::control_service::ControlService;

/// Application state shared across all axum handlers.
///
/// Generic over the firewall backend and the metrics adapter to avoid
/// dynamic dispatch. `Clone` is implemented manually so the backend itself
/// does not need to be `Clone`; only the `Arc` wrappers and the metrics
/// handle are cloned.
pub struct AppState<B, M> {
    /// Service state machine use-cases.
    pub control: Arc<ControlService<B, M>>,
    /// Request gate: token and parameter validation.
    pub auth: Arc<AuthService<M>>,
    /// Metrics recorder and exporter.
    pub metrics: M,
}

impl<B, M: Clone> Clone for AppState<B, M> {
    fn clone(&self) -> Self {
        Self {
            control: Arc::clone(&self.control),
            auth: Arc::clone(&self.auth),
            metrics: self.metrics.clone(),
        }
    }
}

impl<B, M> AppState<B, M> {
    /// Create the state from pre-wrapped services.
    ///
    /// The control service is shared with the quota ticker, so it is passed
    /// in as an `Arc`.
    pub fn new(control: Arc<ControlService<B, M>>, auth: AuthService<M>, metrics: M) -> Self {
        Self {
            control,
            auth: Arc::new(auth),
            metrics,
        }
    }
}
