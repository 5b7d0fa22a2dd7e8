//! # quotaswitch-adapter-prometheus
//!
//! Prometheus adapter: implements the `MetricsRecorder` and
//! `MetricsExporter` ports on top of a private [`prometheus::Registry`].
//!
//! ## Exposed counters
//!
//! | Name | Labels |
//! |------|--------|
//! | `api_actions_total` | `path`, `service`, `status_code` |
//! | `backend_failure` | `service` |
//! | `validation_failure` | `parameter_name` |
//! | `auth_status` | `status` |
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `quotaswitch-app` and
//! `quotaswitch-domain`.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use quotaswitch_app::ports::{
    AuthOutcome, ExportError, MetricsExporter, MetricsRecorder, Parameter,
};
use quotaswitch_domain::service::ServiceName;

/// Counter set registered in its own [`Registry`].
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    api_actions: IntCounterVec,
    backend_failure: IntCounterVec,
    validation_failure: IntCounterVec,
    auth_status: IntCounterVec,
}

fn counter(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> prometheus::Result<IntCounterVec> {
    let vec = IntCounterVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(vec.clone()))?;
    Ok(vec)
}

impl PrometheusMetrics {
    /// Create and register every counter.
    ///
    /// # Errors
    ///
    /// Returns a [`prometheus::Error`] if a metric descriptor is invalid.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        Ok(Self {
            api_actions: counter(
                &registry,
                "api_actions_total",
                "API actions",
                &["path", "service", "status_code"],
            )?,
            backend_failure: counter(
                &registry,
                "backend_failure",
                "The total number of backend errors",
                &["service"],
            )?,
            validation_failure: counter(
                &registry,
                "validation_failure",
                "The total number of failed parameter validations",
                &["parameter_name"],
            )?,
            auth_status: counter(
                &registry,
                "auth_status",
                "The total number of auth requests",
                &["status"],
            )?,
            registry,
        })
    }
}

impl MetricsRecorder for PrometheusMetrics {
    fn record_action(&self, path: &str, service: &ServiceName, status_code: u16) {
        self.api_actions
            .with_label_values(&[path, service.as_str(), &status_code.to_string()])
            .inc();
    }

    fn record_backend_failure(&self, service: &ServiceName) {
        self.backend_failure
            .with_label_values(&[service.as_str()])
            .inc();
    }

    fn record_validation_failure(&self, parameter: Parameter) {
        self.validation_failure
            .with_label_values(&[parameter.label()])
            .inc();
    }

    fn record_auth(&self, outcome: AuthOutcome) {
        self.auth_status.with_label_values(&[outcome.label()]).inc();
    }
}

impl MetricsExporter for PrometheusMetrics {
    fn export_text(&self) -> Result<String, ExportError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|err| ExportError(Box::new(err)))?;
        String::from_utf8(buffer).map_err(|err| ExportError(Box::new(err)))
    }
}
