//! JSON handlers for switching a service and reading its quota.
//!
//! Every endpoint takes the credential and the target service from the
//! `token` and `service` query parameters.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use quotaswitch_app::ports::{FirewallBackend, MetricsRecorder};
use quotaswitch_domain::service::ServiceName;

use crate::error::ApiError;
use crate::state::AppState;

pub const ON_PATH: &str = "/api/v1/service/on";
pub const OFF_PATH: &str = "/api/v1/service/off";
pub const LIMIT_FILL_PATH: &str = "/api/v1/service/limitfill";
pub const STATUS_PATH: &str = "/api/v1/service/status";

/// Query parameters shared by all service endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceQuery {
    pub token: Option<String>,
    pub service: Option<String>,
}

/// Body of a successful state-changing call.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Authenticate the caller and validate the service name.
fn admit<B, M>(state: &AppState<B, M>, query: &ServiceQuery) -> Result<ServiceName, ApiError>
where
    M: MetricsRecorder,
{
    state.auth.authenticate(query.token.as_deref())?;
    Ok(state.auth.parse_service_name(query.service.as_deref())?)
}

/// Turn a use-case result into a response and count it.
///
/// Requests naming an unregistered service are not counted so arbitrary
/// names cannot grow the label set.
fn finish<B, M, T>(
    state: &AppState<B, M>,
    path: &str,
    name: &ServiceName,
    result: Result<T, ApiError>,
) -> Response
where
    M: MetricsRecorder,
    T: IntoResponse,
{
    let unknown = matches!(&result, Err(err) if err.is_not_found());
    let response = result.into_response();
    if !unknown {
        state
            .metrics
            .record_action(path, name, response.status().as_u16());
    }
    response
}

/// `GET /api/v1/service/on`: open the firewall for a service.
pub async fn on<B, M>(
    State(state): State<AppState<B, M>>,
    Query(query): Query<ServiceQuery>,
) -> Response
where
    B: FirewallBackend + Send + Sync + 'static,
    M: MetricsRecorder + Clone + Send + Sync + 'static,
{
    let name = match admit(&state, &query) {
        Ok(name) => name,
        Err(err) => return err.into_response(),
    };
    let result = state
        .control
        .activate(&name)
        .await
        .map(|transition| MessageBody::new(transition.message(&name)))
        .map_err(ApiError::from);
    finish(&state, ON_PATH, &name, result)
}

/// `GET /api/v1/service/off`: close the firewall for a service.
pub async fn off<B, M>(
    State(state): State<AppState<B, M>>,
    Query(query): Query<ServiceQuery>,
) -> Response
where
    B: FirewallBackend + Send + Sync + 'static,
    M: MetricsRecorder + Clone + Send + Sync + 'static,
{
    let name = match admit(&state, &query) {
        Ok(name) => name,
        Err(err) => return err.into_response(),
    };
    let result = state
        .control
        .deactivate(&name)
        .await
        .map(|transition| MessageBody::new(transition.message(&name)))
        .map_err(ApiError::from);
    finish(&state, OFF_PATH, &name, result)
}

/// `GET /api/v1/service/limitfill`: mark today's quota as used up.
pub async fn limit_fill<B, M>(
    State(state): State<AppState<B, M>>,
    Query(query): Query<ServiceQuery>,
) -> Response
where
    B: FirewallBackend + Send + Sync + 'static,
    M: MetricsRecorder + Clone + Send + Sync + 'static,
{
    let name = match admit(&state, &query) {
        Ok(name) => name,
        Err(err) => return err.into_response(),
    };
    let result = state
        .control
        .fill_quota(&name)
        .await
        .map(|()| MessageBody::new("Limit fill ok."))
        .map_err(ApiError::from);
    finish(&state, LIMIT_FILL_PATH, &name, result)
}

/// `GET /api/v1/service/status`: snapshot of the service record.
pub async fn status<B, M>(
    State(state): State<AppState<B, M>>,
    Query(query): Query<ServiceQuery>,
) -> Response
where
    B: FirewallBackend + Send + Sync + 'static,
    M: MetricsRecorder + Clone + Send + Sync + 'static,
{
    let name = match admit(&state, &query) {
        Ok(name) => name,
        Err(err) => return err.into_response(),
    };
    let result = state
        .control
        .status(&name)
        .await
        .map(Json)
        .map_err(ApiError::from);
    finish(&state, STATUS_PATH, &name, result)
}
