//! Control service: the service state machine use-cases.
//!
//! Every operation resolves a [`ManagedService`] and runs under its lock, so
//! `activate`, `deactivate` and the tick never interleave on one service.

use std::sync::Arc;

use quotaswitch_domain::error::QuotaSwitchError;
use quotaswitch_domain::service::{Service, ServiceName, ServiceStatus, TickOutcome, Transition};
use quotaswitch_domain::time::now;

use crate::ports::{FirewallBackend, MetricsRecorder};
use crate::registry::{ManagedService, ServiceRegistry};

/// Application service driving on/off transitions and quota bookkeeping.
pub struct ControlService<B, M> {
    registry: Arc<ServiceRegistry>,
    backend: B,
    metrics: M,
}

impl<B, M> ControlService<B, M>
where
    B: FirewallBackend + Send + Sync,
    M: MetricsRecorder + Send + Sync,
{
    /// Create a new service over the given registry, backend and metrics.
    pub fn new(registry: Arc<ServiceRegistry>, backend: B, metrics: M) -> Self {
        Self {
            registry,
            backend,
            metrics,
        }
    }

    /// Switch a service on, unless today's quota is already used up.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaSwitchError::NotFound`] for an unknown service,
    /// [`QuotaSwitchError::Configuration`] if it has no binding, or
    /// [`QuotaSwitchError::Backend`] if the firewall call failed.
    #[tracing::instrument(skip(self, name), fields(service = %name))]
    pub async fn activate(&self, name: &ServiceName) -> Result<Transition, QuotaSwitchError> {
        let managed = self.registry.lookup(name)?;
        let mut service = managed.lock().await;
        self.activate_locked(&mut service).await
    }

    /// Switch a service off. Always attempted, whatever the quota state.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaSwitchError::NotFound`] for an unknown service,
    /// [`QuotaSwitchError::Configuration`] if it has no binding, or
    /// [`QuotaSwitchError::Backend`] if the firewall call failed.
    #[tracing::instrument(skip(self, name), fields(service = %name))]
    pub async fn deactivate(&self, name: &ServiceName) -> Result<Transition, QuotaSwitchError> {
        let managed = self.registry.lookup(name)?;
        let mut service = managed.lock().await;
        self.deactivate_locked(&mut service).await
    }

    /// Mark today's quota as used up so further activations are refused.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaSwitchError::NotFound`] for an unknown service.
    #[tracing::instrument(skip(self, name), fields(service = %name))]
    pub async fn fill_quota(&self, name: &ServiceName) -> Result<(), QuotaSwitchError> {
        let managed = self.registry.lookup(name)?;
        managed.lock().await.fill_quota();
        tracing::info!("quota filled");
        Ok(())
    }

    /// Snapshot of a service's public record.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaSwitchError::NotFound`] for an unknown service.
    pub async fn status(&self, name: &ServiceName) -> Result<ServiceStatus, QuotaSwitchError> {
        let managed = self.registry.lookup(name)?;
        Ok(managed.status().await)
    }

    /// Advance every service's quota by one minute, switching off any
    /// service whose quota this exhausts.
    ///
    /// Never fails: a failed forced shutoff is logged and counted, and the
    /// tick carries on with the next service.
    pub async fn tick_all(&self) {
        for managed in self.registry.iter() {
            self.tick(managed).await;
        }
    }

    /// Clear every service's counter for a new day.
    pub async fn reset_all(&self) {
        for managed in self.registry.iter() {
            managed.lock().await.reset_quota();
        }
        tracing::info!(services = self.registry.len(), "daily quota reset");
    }

    async fn tick(&self, managed: &ManagedService) {
        let mut service = managed.lock().await;
        if service.advance_tick() != TickOutcome::ShutoffRequired {
            return;
        }

        tracing::info!(
            service = %service.name(),
            counter = service.quota_counter(),
            limit = service.quota_limit(),
            "quota exceeded, switching service off"
        );
        if let Err(err) = self.deactivate_locked(&mut service).await {
            // The remote resource may still be on while bookkeeping expects it off.
            tracing::error!(
                service = %service.name(),
                error = ?err,
                "automatic shutoff failed"
            );
        }
    }

    async fn activate_locked(&self, service: &mut Service) -> Result<Transition, QuotaSwitchError> {
        let binding = service.binding()?.clone();

        if service.is_quota_exceeded() {
            tracing::info!("activation refused, day limit reached");
            return Ok(Transition::QuotaExceeded);
        }

        if let Err(err) = self.backend.enable(&binding).await {
            self.metrics.record_backend_failure(service.name());
            tracing::warn!(error = ?err, "firewall enable failed");
            return Err(err.into());
        }

        service.mark_active(now())?;
        tracing::info!("service activated");
        Ok(Transition::Activated)
    }

    async fn deactivate_locked(
        &self,
        service: &mut Service,
    ) -> Result<Transition, QuotaSwitchError> {
        let binding = service.binding()?.clone();

        if let Err(err) = self.backend.disable(&binding).await {
            self.metrics.record_backend_failure(service.name());
            tracing::warn!(error = ?err, "firewall disable failed");
            return Err(err.into());
        }

        service.mark_inactive(now());
        tracing::info!("service deactivated");
        Ok(Transition::Deactivated)
    }
}
