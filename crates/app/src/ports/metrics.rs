//! Metrics port: counters observed by the request gate, the HTTP layer and
//! the state machine.

use std::error::Error as StdError;

use quotaswitch_domain::service::ServiceName;

/// Which request parameter failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Token,
    Service,
}

impl Parameter {
    /// Label value used by exporters.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Service => "service",
        }
    }
}

/// Result of checking a caller's credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    TokenFormatInvalid,
    TokenInvalid,
}

impl AuthOutcome {
    /// Label value used by exporters.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::TokenFormatInvalid => "token format invalid",
            Self::TokenInvalid => "token invalid",
        }
    }
}

/// Records operational counters.
///
/// Recording never fails and never blocks on IO.
pub trait MetricsRecorder {
    /// Count one handled API action, labelled by route, service and status.
    fn record_action(&self, path: &str, service: &ServiceName, status_code: u16);

    /// Count one failed call to the control backend.
    fn record_backend_failure(&self, service: &ServiceName);

    /// Count one rejected request parameter.
    fn record_validation_failure(&self, parameter: Parameter);

    /// Count one authentication attempt.
    fn record_auth(&self, outcome: AuthOutcome);
}

impl<T: MetricsRecorder> MetricsRecorder for std::sync::Arc<T> {
    fn record_action(&self, path: &str, service: &ServiceName, status_code: u16) {
        (**self).record_action(path, service, status_code);
    }

    fn record_backend_failure(&self, service: &ServiceName) {
        (**self).record_backend_failure(service);
    }

    fn record_validation_failure(&self, parameter: Parameter) {
        (**self).record_validation_failure(parameter);
    }

    fn record_auth(&self, outcome: AuthOutcome) {
        (**self).record_auth(outcome);
    }
}

/// Renders collected metrics in a scrape format.
pub trait MetricsExporter {
    /// Encode every registered metric as text.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if encoding fails.
    fn export_text(&self) -> Result<String, ExportError>;
}

impl<T: MetricsExporter> MetricsExporter for std::sync::Arc<T> {
    fn export_text(&self) -> Result<String, ExportError> {
        (**self).export_text()
    }
}

/// Metrics could not be encoded.
#[derive(Debug, thiserror::Error)]
#[error("failed to export metrics")]
pub struct ExportError(#[source] pub Box<dyn StdError + Send + Sync>);
