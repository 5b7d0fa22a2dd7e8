//! # quotaswitch-adapter-hetzner
//!
//! Hetzner Cloud firewall adapter: implements the `FirewallBackend` port.
//!
//! ## How it works
//!
//! A service is switched on or off by replacing the complete rule set of
//! its firewall through `POST /v1/firewalls/{id}/actions/set_rules`. The
//! two rule sets are JSON files authored ahead of time; the matching one is
//! read from disk on every call and sent verbatim as the request body, so
//! edits take effect without a restart.
//!
//! Each call is a single request with a bounded timeout. Nothing is retried:
//! a failed switch is reported to the caller and the service state is left
//! untouched.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `quotaswitch-app` and
//! `quotaswitch-domain`.

mod config;
mod error;

pub use config::HetznerConfig;
pub use error::HetznerError;

use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use quotaswitch_app::ports::FirewallBackend;
use quotaswitch_domain::error::BackendError;
use quotaswitch_domain::service::FirewallBinding;

/// [`FirewallBackend`] backed by the Hetzner Cloud API.
#[derive(Debug, Clone)]
pub struct HetznerFirewallClient {
    http: reqwest::Client,
    config: HetznerConfig,
}

impl HetznerFirewallClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HetznerError::Request`] if the HTTP client cannot be
    /// initialised (e.g. TLS backend failure).
    pub fn new(config: HetznerConfig) -> Result<Self, HetznerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn set_rules_url(&self, firewall_id: &str) -> String {
        format!(
            "{}/v1/firewalls/{firewall_id}/actions/set_rules",
            self.config.api_base_url.trim_end_matches('/')
        )
    }

    async fn set_rules(
        &self,
        binding: &FirewallBinding,
        rules_path: &Path,
    ) -> Result<(), HetznerError> {
        let body = tokio::fs::read(rules_path)
            .await
            .map_err(|source| HetznerError::RulesFile {
                path: rules_path.to_path_buf(),
                source,
            })?;

        let response = self
            .http
            .post(self.set_rules_url(binding.firewall_id()))
            .bearer_auth(binding.token())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HetznerError::Status(status));
        }

        tracing::debug!(
            firewall_id = binding.firewall_id(),
            rules = %rules_path.display(),
            "firewall rules applied"
        );
        Ok(())
    }
}

impl FirewallBackend for HetznerFirewallClient {
    async fn enable(&self, binding: &FirewallBinding) -> Result<(), BackendError> {
        self.set_rules(binding, &self.config.enable_rules_path)
            .await
            .map_err(BackendError::from)
    }

    async fn disable(&self, binding: &FirewallBinding) -> Result<(), BackendError> {
        self.set_rules(binding, &self.config.disable_rules_path)
            .await
            .map_err(BackendError::from)
    }
}
