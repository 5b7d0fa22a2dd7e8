//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use quotaswitch_app::ports::{FirewallBackend, MetricsExporter, MetricsRecorder};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the control API under `/api/v1` and serves `/metrics` and
/// `/health` at the root. Includes a [`TraceLayer`] that logs each HTTP
/// request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<B, M>(state: AppState<B, M>) -> Router
where
    B: FirewallBackend + Send + Sync + 'static,
    M: MetricsRecorder + MetricsExporter + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(crate::metrics::export::<B, M>))
        .nest("/api/v1", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use quotaswitch_app::ports::{AuthOutcome, ExportError, Parameter};
    use quotaswitch_app::registry::ServiceRegistry;
    use quotaswitch_app::services::auth_service::AuthService;
    use quotaswitch_app::services::control_service::ControlService;
    use quotaswitch_domain::error::BackendError;
    use quotaswitch_domain::service::{FirewallBinding, Service, ServiceName};
    use quotaswitch_domain::token::ApiToken;

    const TOKEN: &str = "secret42";

    #[derive(Default)]
    struct StubBackend {
        fail: AtomicBool,
        enables: AtomicUsize,
    }

    impl FirewallBackend for StubBackend {
        async fn enable(&self, _binding: &FirewallBinding) -> Result<(), BackendError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(BackendError::new(std::io::Error::other("connection refused")));
            }
            self.enables.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn disable(&self, _binding: &FirewallBinding) -> Result<(), BackendError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(BackendError::new(std::io::Error::other("connection refused")));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingMetrics {
        actions: Mutex<Vec<(String, String, u16)>>,
        backend_failures: AtomicUsize,
        broken: AtomicBool,
    }

    impl MetricsRecorder for RecordingMetrics {
        fn record_action(&self, path: &str, service: &ServiceName, status_code: u16) {
            self.actions.lock().unwrap().push((
                path.to_string(),
                service.to_string(),
                status_code,
            ));
        }

        fn record_backend_failure(&self, _service: &ServiceName) {
            self.backend_failures.fetch_add(1, Ordering::SeqCst);
        }

        fn record_validation_failure(&self, _parameter: Parameter) {}

        fn record_auth(&self, _outcome: AuthOutcome) {}
    }

    impl MetricsExporter for RecordingMetrics {
        fn export_text(&self) -> Result<String, ExportError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(ExportError(Box::new(std::io::Error::other("encoder"))));
            }
            Ok("auth_status{status=\"success\"} 1\n".to_string())
        }
    }

    struct Harness {
        app: Router,
        backend: Arc<StubBackend>,
        metrics: Arc<RecordingMetrics>,
    }

    fn harness() -> Harness {
        let chatx = Service::new(ServiceName::parse("chatx").unwrap(), 4)
            .with_firewall_binding(FirewallBinding::new("hetzner", "42").unwrap());
        let unbound = Service::new(ServiceName::parse("wiki").unwrap(), 4);
        let registry = Arc::new(ServiceRegistry::new([chatx, unbound]).unwrap());

        let backend = Arc::new(StubBackend::default());
        let metrics = Arc::new(RecordingMetrics::default());
        let control = Arc::new(ControlService::new(
            registry,
            Arc::clone(&backend),
            Arc::clone(&metrics),
        ));
        let auth = AuthService::new(ApiToken::parse(TOKEN).unwrap(), Arc::clone(&metrics));
        let state = AppState::new(control, auth, Arc::clone(&metrics));

        Harness {
            app: build(state),
            backend,
            metrics,
        }
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let h = harness();
        let (status, body) = get(&h.app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn should_activate_service_when_token_is_valid() {
        let h = harness();
        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/on?token={TOKEN}&service=chatx"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["message"], "Service: chatx is activated!");
        assert_eq!(h.backend.enables.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.metrics.actions.lock().unwrap().as_slice(),
            &[("/api/v1/service/on".to_string(), "chatx".to_string(), 200)]
        );
    }

    #[tokio::test]
    async fn should_deactivate_service_when_token_is_valid() {
        let h = harness();
        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/off?token={TOKEN}&service=chatx"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["message"], "Service: chatx is deactivated!");
    }

    #[tokio::test]
    async fn should_return_401_when_token_is_missing() {
        let h = harness();
        let (status, body) = get(&h.app, "/api/v1/service/on?service=chatx").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            json(&body)["error"],
            "token is not in valid format (alphanumeric only)"
        );
        assert_eq!(h.backend.enables.load(Ordering::SeqCst), 0);
        assert!(h.metrics.actions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_401_when_token_does_not_match() {
        let h = harness();
        let (status, body) = get(&h.app, "/api/v1/service/on?token=wrong&service=chatx").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json(&body)["error"], "token is invalid");
    }

    #[tokio::test]
    async fn should_return_400_when_service_name_is_not_alphabetic() {
        let h = harness();
        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/status?token={TOKEN}&service=chat1"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "service name is not valid (alpha only)");
    }

    #[tokio::test]
    async fn should_return_400_without_counting_when_service_is_unknown() {
        let h = harness();
        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/on?token={TOKEN}&service=nope"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "no valid service found: nope");
        assert!(h.metrics.actions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_activation_when_limit_was_filled() {
        let h = harness();
        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/limitfill?token={TOKEN}&service=chatx"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["message"], "Limit fill ok.");

        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/on?token={TOKEN}&service=chatx"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["message"], "Service: chatx day limit is reached!");
        assert_eq!(h.backend.enables.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_return_status_record() {
        let h = harness();
        get(&h.app, &format!("/api/v1/service/on?token={TOKEN}&service=chatx")).await;

        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/status?token={TOKEN}&service=chatx"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let record = json(&body);
        assert_eq!(record["name"], "chatx");
        assert_eq!(record["kind"], "hetzner-firewall");
        assert_eq!(record["quota_counter"], 0);
        assert_eq!(record["quota_limit"], 4);
        assert_eq!(record["active"], true);
        assert_eq!(record["quota_exceeded"], false);
    }

    #[tokio::test]
    async fn should_return_500_when_backend_fails() {
        let h = harness();
        h.backend.fail.store(true, Ordering::SeqCst);

        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/on?token={TOKEN}&service=chatx"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body)["error"], "some errors occurred with hetzner api");
        assert_eq!(h.metrics.backend_failures.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.metrics.actions.lock().unwrap().as_slice(),
            &[("/api/v1/service/on".to_string(), "chatx".to_string(), 500)]
        );
    }

    #[tokio::test]
    async fn should_return_500_when_service_has_no_backend() {
        let h = harness();
        let (status, body) = get(
            &h.app,
            &format!("/api/v1/service/on?token={TOKEN}&service=wiki"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body)["error"], "service type is not defined for wiki");
    }

    #[tokio::test]
    async fn should_serve_metrics_text() {
        let h = harness();
        let (status, body) = get(&h.app, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("auth_status"));
    }

    #[tokio::test]
    async fn should_return_500_when_metrics_cannot_be_encoded() {
        let h = harness();
        h.metrics.broken.store(true, Ordering::SeqCst);

        let (status, _) = get(&h.app, "/metrics").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn should_return_404_when_route_is_unknown() {
        let h = harness();
        let (status, _) = get(&h.app, "/api/v1/service/restart").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
