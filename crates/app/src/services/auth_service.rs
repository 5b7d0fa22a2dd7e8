//! Auth service: the request gate in front of every control use-case.
//!
//! Checks the caller's credential and the lexical form of the service name
//! before the registry is ever consulted.

use quotaswitch_domain::error::{AuthError, QuotaSwitchError, ValidationError};
use quotaswitch_domain::service::ServiceName;
use quotaswitch_domain::token::ApiToken;

use crate::ports::{AuthOutcome, MetricsRecorder, Parameter};

/// Validates credentials and request parameters.
pub struct AuthService<M> {
    secret: ApiToken,
    metrics: M,
}

impl<M: MetricsRecorder> AuthService<M> {
    /// Create a gate that accepts exactly `secret`.
    pub fn new(secret: ApiToken, metrics: M) -> Self {
        Self { secret, metrics }
    }

    /// Check a raw bearer credential.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaSwitchError::Unauthorized`] with
    /// [`AuthError::MalformedToken`] if the token is absent or not
    /// alphanumeric, or [`AuthError::InvalidToken`] if it does not match.
    pub fn authenticate(&self, raw: Option<&str>) -> Result<(), QuotaSwitchError> {
        let Ok(token) = ApiToken::parse(raw.unwrap_or_default()) else {
            self.metrics.record_auth(AuthOutcome::TokenFormatInvalid);
            self.metrics.record_validation_failure(Parameter::Token);
            return Err(AuthError::MalformedToken.into());
        };

        if !self.secret.verify(&token) {
            self.metrics.record_auth(AuthOutcome::TokenInvalid);
            tracing::debug!("rejected request with invalid token");
            return Err(AuthError::InvalidToken.into());
        }

        self.metrics.record_auth(AuthOutcome::Success);
        Ok(())
    }

    /// Validate the `service` request parameter.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaSwitchError::Validation`] if the name is absent or not
    /// purely alphabetic.
    pub fn parse_service_name(&self, raw: Option<&str>) -> Result<ServiceName, QuotaSwitchError> {
        ServiceName::parse(raw.unwrap_or_default()).map_err(|err: ValidationError| {
            self.metrics.record_validation_failure(Parameter::Service);
            err.into()
        })
    }
}
