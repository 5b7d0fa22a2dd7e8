//! # quotaswitch-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `FirewallBackend`: enact on/off by applying a firewall rule set
//!   - `MetricsRecorder`: count actions, backend failures, auth outcomes
//!   - `MetricsExporter`: render collected metrics for scraping
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ControlService`: activate, deactivate, fill quota, status, tick
//!   - `AuthService`: token and service-name checks before any use-case
//!   - `QuotaTicker`: per-minute quota advance and daily reset
//! - Own the `ServiceRegistry` and its per-service locking discipline
//!
//! ## Dependency rule
//! Depends on `quotaswitch-domain` only (plus `tokio` for locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod registry;
pub mod services;
pub mod ticker;
