//! # quotaswitch-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **control API** under `/api/v1/service/*` (`on`, `off`,
//!   `limitfill`, `status`), authenticated by a `token` query parameter
//! - Serve `/metrics` in the Prometheus text format and `/health`
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into JSON responses
//!
//! ## Dependency rule
//! Depends on `quotaswitch-app` (for port traits and services) and
//! `quotaswitch-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod metrics;
pub mod router;
pub mod state;
