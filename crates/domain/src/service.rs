//! Service: a remote resource that can be switched on and off, with a
//! daily quota of active minutes.
//!
//! The [`Service`] record holds the quota bookkeeping and enforces the
//! invariants that do not involve IO:
//!
//! - the counter only grows while the service is active,
//! - a service without a [`FirewallBinding`] can never become active,
//! - a tick that pushes the counter past the limit asks for a shutoff.
//!
//! Calling the backend is the application layer's job; it reports the
//! result back through [`Service::mark_active`] / [`Service::mark_inactive`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ValidationError};
use crate::time::{Timestamp, now};

/// Validated service identifier: non-empty, ASCII letters only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    /// Parse and validate a raw name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidServiceName`] if the value is empty
    /// or contains anything other than ASCII letters.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidServiceName);
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ServiceName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which control backend drives a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// On/off is enacted by replacing the rule set of a Hetzner Cloud firewall.
    HetznerFirewall,
}

/// Credentials and target needed to drive a firewall-backed service.
#[derive(Clone, PartialEq, Eq)]
pub struct FirewallBinding {
    token: String,
    firewall_id: String,
}

impl FirewallBinding {
    /// Build a binding from an API token and firewall id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteBinding`] if either part is empty.
    pub fn new(
        token: impl Into<String>,
        firewall_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let token = token.into();
        let firewall_id = firewall_id.into();
        if token.is_empty() || firewall_id.is_empty() {
            return Err(ValidationError::IncompleteBinding);
        }
        Ok(Self { token, firewall_id })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn firewall_id(&self) -> &str {
        &self.firewall_id
    }
}

impl fmt::Debug for FirewallBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirewallBinding")
            .field("token", &"***")
            .field("firewall_id", &self.firewall_id)
            .finish()
    }
}

/// Result of a successful activation or deactivation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Activated,
    Deactivated,
    /// Activation was refused because today's quota is used up. Not an error.
    QuotaExceeded,
}

impl Transition {
    /// Human-readable status line returned to the caller.
    #[must_use]
    pub fn message(self, name: &ServiceName) -> String {
        match self {
            Self::Activated => format!("Service: {name} is activated!"),
            Self::Deactivated => format!("Service: {name} is deactivated!"),
            Self::QuotaExceeded => format!("Service: {name} day limit is reached!"),
        }
    }
}

/// What a tick did to a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The service was off; nothing changed.
    Idle,
    /// One active minute was counted and the quota still holds.
    Counted,
    /// The quota is exceeded while the service is still on: it must be
    /// switched off.
    ShutoffRequired,
}

/// A controlled resource with its quota counters and on/off state.
#[derive(Debug, Clone)]
pub struct Service {
    name: ServiceName,
    kind: ServiceKind,
    quota_counter: u64,
    quota_limit: u32,
    active: bool,
    binding: Option<FirewallBinding>,
    last_changed: Timestamp,
}

impl Service {
    /// Create an inactive, unbound service with an empty counter.
    #[must_use]
    pub fn new(name: ServiceName, quota_limit: u32) -> Self {
        Self {
            name,
            kind: ServiceKind::HetznerFirewall,
            quota_counter: 0,
            quota_limit,
            active: false,
            binding: None,
            last_changed: now(),
        }
    }

    /// Attach a firewall binding.
    #[must_use]
    pub fn with_firewall_binding(mut self, binding: FirewallBinding) -> Self {
        self.kind = ServiceKind::HetznerFirewall;
        self.binding = Some(binding);
        self
    }

    #[must_use]
    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    #[must_use]
    pub fn quota_counter(&self) -> u64 {
        self.quota_counter
    }

    #[must_use]
    pub fn quota_limit(&self) -> u32 {
        self.quota_limit
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn last_changed(&self) -> Timestamp {
        self.last_changed
    }

    /// `true` once more minutes were used than the daily limit allows.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        self.quota_counter > u64::from(self.quota_limit)
    }

    /// The binding required to drive the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::BackendNotDefined`] if none is attached.
    pub fn binding(&self) -> Result<&FirewallBinding, ConfigurationError> {
        self.binding
            .as_ref()
            .ok_or_else(|| ConfigurationError::BackendNotDefined {
                service: self.name.to_string(),
            })
    }

    /// Record that the backend switched the resource on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::BackendNotDefined`] if the service has
    /// no binding; the state is left unchanged.
    pub fn mark_active(&mut self, ts: Timestamp) -> Result<(), ConfigurationError> {
        self.binding()?;
        if !self.active {
            self.active = true;
            self.last_changed = ts;
        }
        Ok(())
    }

    /// Record that the backend switched the resource off.
    pub fn mark_inactive(&mut self, ts: Timestamp) {
        if self.active {
            self.active = false;
            self.last_changed = ts;
        }
    }

    /// Advance the quota by one minute.
    ///
    /// The counter grows only while active. Returns
    /// [`TickOutcome::ShutoffRequired`] when the service is still on but the
    /// quota is now exceeded.
    pub fn advance_tick(&mut self) -> TickOutcome {
        if !self.active {
            return TickOutcome::Idle;
        }
        self.quota_counter = self.quota_counter.saturating_add(1);
        if self.is_quota_exceeded() {
            TickOutcome::ShutoffRequired
        } else {
            TickOutcome::Counted
        }
    }

    /// Force the quota into the exceeded state without touching `active`.
    ///
    /// The counter is wider than the limit, so this holds for every limit.
    pub fn fill_quota(&mut self) {
        self.quota_counter = u64::from(self.quota_limit) + 1;
    }

    /// Start a new day: clear the counter without touching `active`.
    pub fn reset_quota(&mut self) {
        self.quota_counter = 0;
    }

    /// Serializable snapshot of the public record.
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            name: self.name.clone(),
            kind: self.kind,
            quota_counter: self.quota_counter,
            quota_limit: self.quota_limit,
            active: self.active,
            quota_exceeded: self.is_quota_exceeded(),
            last_changed: self.last_changed,
        }
    }
}

/// Public view of a [`Service`]; never includes the binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: ServiceName,
    pub kind: ServiceKind,
    pub quota_counter: u64,
    pub quota_limit: u32,
    pub active: bool,
    pub quota_exceeded: bool,
    pub last_changed: Timestamp,
}
