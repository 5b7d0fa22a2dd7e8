//! Firewall port: the boundary that physically switches a service on or off.

use std::future::Future;

use quotaswitch_domain::error::BackendError;
use quotaswitch_domain::service::FirewallBinding;

/// Applies a pre-authored rule set to the firewall named by a binding.
///
/// Each call is exactly one outbound request. Implementations must not
/// retry; any failure is reported as an opaque [`BackendError`].
pub trait FirewallBackend {
    /// Apply the "enable" rule set, opening access to the service.
    fn enable(
        &self,
        binding: &FirewallBinding,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Apply the "disable" rule set, closing access to the service.
    fn disable(
        &self,
        binding: &FirewallBinding,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

impl<T: FirewallBackend + Send + Sync> FirewallBackend for std::sync::Arc<T> {
    fn enable(
        &self,
        binding: &FirewallBinding,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).enable(binding)
    }

    fn disable(
        &self,
        binding: &FirewallBinding,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).disable(binding)
    }
}
