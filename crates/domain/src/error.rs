//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`QuotaSwitchError`] via `#[from]`.

use std::error::Error as StdError;

/// Top-level error returned by application use-cases.
#[derive(Debug, thiserror::Error)]
pub enum QuotaSwitchError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("unauthorized")]
    Unauthorized(#[from] AuthError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),

    #[error("backend error")]
    Backend(#[from] BackendError),
}

/// Malformed input rejected before any service logic runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("service name is not valid (alpha only)")]
    InvalidServiceName,

    #[error("firewall binding must have a non-empty token and id")]
    IncompleteBinding,

    #[error("service name is registered twice: {0}")]
    DuplicateServiceName(String),
}

/// Rejected credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token is not in valid format (alphanumeric only)")]
    MalformedToken,

    #[error("token is invalid")]
    InvalidToken,
}

/// A lookup by name found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no valid {entity} found: {name}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub name: String,
}

/// The service has no control backend bound to it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("service type is not defined for {service}")]
    BackendNotDefined { service: String },
}

/// The outbound control call failed.
///
/// The source is opaque to the application layer: every backend failure is
/// treated the same way.
#[derive(Debug, thiserror::Error)]
#[error("control backend call failed")]
pub struct BackendError(#[source] pub Box<dyn StdError + Send + Sync>);

impl BackendError {
    /// Wrap any error as a backend failure.
    pub fn new(err: impl StdError + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_via_from() {
        let err: QuotaSwitchError = ValidationError::InvalidServiceName.into();
        assert!(matches!(
            err,
            QuotaSwitchError::Validation(ValidationError::InvalidServiceName)
        ));
    }

    #[test]
    fn should_display_not_found_with_name() {
        let err = NotFoundError {
            entity: "service",
            name: "chatx".to_string(),
        };
        assert_eq!(err.to_string(), "no valid service found: chatx");
    }

    #[test]
    fn should_keep_backend_source() {
        let io = std::io::Error::other("connection reset");
        let err = BackendError::new(io);
        let source = StdError::source(&err).unwrap();
        assert_eq!(source.to_string(), "connection reset");
    }

    #[test]
    fn should_display_auth_errors() {
        assert_eq!(
            AuthError::MalformedToken.to_string(),
            "token is not in valid format (alphanumeric only)"
        );
        assert_eq!(AuthError::InvalidToken.to_string(), "token is invalid");
    }
}
