//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `quotaswitch.toml` in the working directory. Every field has a
//! sensible default so the file is optional, except the API token which must
//! come from either the file or `API_TOKEN`. Environment variables take
//! precedence over file values.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use quotaswitch_adapter_hetzner::HetznerConfig;
use quotaswitch_app::ticker::DEFAULT_PERIOD;
use quotaswitch_domain::service::{FirewallBinding, Service, ServiceName};
use quotaswitch_domain::time::ResetSchedule;
use quotaswitch_domain::token::ApiToken;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Control API credential.
    pub auth: AuthConfig,
    /// Quota counting and reset.
    pub quota: QuotaConfig,
    /// Firewall API settings.
    pub firewall: HetznerConfig,
    /// Managed services.
    pub services: Vec<ServiceConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Shared-secret authentication.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token every API request must carry.
    pub api_token: String,
}

/// Quota ticker configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Local hour (0-23) at which all quotas are reset.
    pub reset_hour: u32,
    /// Seconds between two quota ticks.
    ///
    /// Each tick counts one minute of quota, so any value other than 60 is
    /// only meant for testing: counters stop matching wall-clock minutes and
    /// the reset can fire on several ticks within the reset minute.
    pub tick_interval_secs: u64,
}

/// One managed service.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Alphabetic service name used in API requests.
    pub name: String,
    /// Active minutes allowed per day.
    pub daily_limit_minutes: u32,
    /// Environment variable holding the firewall API token.
    pub token_env: String,
    /// Environment variable holding the firewall id.
    pub firewall_id_env: String,
}

impl Config {
    /// Load configuration from `quotaswitch.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("quotaswitch.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(val) = env("QUOTASWITCH_HOST") {
            self.server.host = val;
        }
        if let Some(port) = env("QUOTASWITCH_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = env("QUOTASWITCH_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = env("QUOTASWITCH_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = env("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = env("API_TOKEN") {
            self.auth.api_token = val;
        }
        if let Some(val) = env("QUOTASWITCH_HETZNER_API_URL") {
            self.firewall.api_base_url = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.api_token()?;
        self.reset_schedule()?;
        if self.quota.tick_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "tick interval must be non-zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            ServiceName::parse(&service.name).map_err(|err| {
                ConfigError::Validation(format!("service {:?}: {err}", service.name))
            })?;
            if !seen.insert(service.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "service {:?} is configured twice",
                    service.name
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The credential API callers must present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the token is empty or not
    /// alphanumeric.
    pub fn api_token(&self) -> Result<ApiToken, ConfigError> {
        ApiToken::parse(&self.auth.api_token).map_err(|_| {
            ConfigError::Validation(
                "api token must be set and alphanumeric (API_TOKEN)".to_string(),
            )
        })
    }

    /// When the daily quota reset fires.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the hour is out of range.
    pub fn reset_schedule(&self) -> Result<ResetSchedule, ConfigError> {
        ResetSchedule::at_hour(self.quota.reset_hour).ok_or_else(|| {
            ConfigError::Validation(format!(
                "reset hour must be below 24, got {}",
                self.quota.reset_hour
            ))
        })
    }

    /// Period of the quota ticker.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.quota.tick_interval_secs)
    }

    /// Accepted settings that change how the quota behaves.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.tick_interval() != DEFAULT_PERIOD {
            warnings.push(format!(
                "tick interval is {}s instead of {}s: quota counters no longer count minutes \
                 and the daily reset may run more than once",
                self.quota.tick_interval_secs,
                DEFAULT_PERIOD.as_secs()
            ));
        }
        warnings
    }

    /// Build the domain services, resolving firewall credentials through
    /// `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a service name is invalid.
    pub fn build_services(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Vec<Service>, ConfigError> {
        self.services
            .iter()
            .map(|service| service.build(&env))
            .collect()
    }
}

impl ServiceConfig {
    fn build(&self, env: &impl Fn(&str) -> Option<String>) -> Result<Service, ConfigError> {
        let name = ServiceName::parse(&self.name)
            .map_err(|err| ConfigError::Validation(format!("service {:?}: {err}", self.name)))?;
        let service = Service::new(name, self.daily_limit_minutes);

        let token = env(&self.token_env).unwrap_or_default();
        let firewall_id = env(&self.firewall_id_env).unwrap_or_default();
        match FirewallBinding::new(token, firewall_id) {
            Ok(binding) => Ok(service.with_firewall_binding(binding)),
            Err(_) => {
                tracing::warn!(
                    service = %self.name,
                    token_env = %self.token_env,
                    firewall_id_env = %self.firewall_id_env,
                    "firewall credentials missing, service cannot be switched"
                );
                Ok(service)
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            auth: AuthConfig::default(),
            quota: QuotaConfig::default(),
            firewall: HetznerConfig::default(),
            services: vec![ServiceConfig::default()],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "quotaswitchd=info,quotaswitch=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            reset_hour: ResetSchedule::default().hour(),
            tick_interval_secs: DEFAULT_PERIOD.as_secs(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "chatx".to_string(),
            daily_limit_minutes: 4,
            token_env: "HETZNER_TOKEN".to_string(),
            firewall_id_env: "HETZNER_FW_ID".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
