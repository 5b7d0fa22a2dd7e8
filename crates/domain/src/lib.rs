//! # quotaswitch-domain
//!
//! Pure domain model for the quotaswitch control service.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy, timestamps, the daily reset schedule
//! - Define **Services** (remote resources switched on/off, each with a
//!   daily quota of active minutes)
//! - Define **Bindings** (credentials that let a backend enact on/off)
//! - Define **Tokens** (the shared API credential presented by callers)
//! - Contain all invariant enforcement and quota bookkeeping
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod service;
pub mod token;
