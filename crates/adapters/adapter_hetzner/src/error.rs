//! Hetzner adapter error types.

use std::path::PathBuf;

use quotaswitch_domain::error::BackendError;

/// Errors specific to the Hetzner firewall adapter.
#[derive(Debug, thiserror::Error)]
pub enum HetznerError {
    /// The rule set file could not be read.
    #[error("failed to read rule set {}", path.display())]
    RulesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("firewall api request failed")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("firewall api answered {0}")]
    Status(reqwest::StatusCode),
}

impl From<HetznerError> for BackendError {
    fn from(err: HetznerError) -> Self {
        BackendError::new(err)
    }
}
