//! Service registry: the startup-populated name → service table.
//!
//! The map itself is immutable after construction, so lookups need no lock.
//! Each [`ManagedService`] carries its own mutex: every read-modify-write on
//! a service (including the backend call it may trigger) happens while that
//! lock is held, so request-driven and tick-driven transitions on the same
//! service are serialized while different services proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use quotaswitch_domain::error::{NotFoundError, ValidationError};
use quotaswitch_domain::service::{Service, ServiceName, ServiceStatus};

/// A [`Service`] behind its exclusive-access lock.
#[derive(Debug)]
pub struct ManagedService {
    name: ServiceName,
    state: Mutex<Service>,
}

impl ManagedService {
    /// Wrap a service.
    #[must_use]
    pub fn new(service: Service) -> Self {
        Self {
            name: service.name().clone(),
            state: Mutex::new(service),
        }
    }

    /// The immutable service name (readable without locking).
    #[must_use]
    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    /// Acquire exclusive access to the service record.
    pub async fn lock(&self) -> MutexGuard<'_, Service> {
        self.state.lock().await
    }

    /// Take a consistent snapshot of the public record.
    pub async fn status(&self) -> ServiceStatus {
        self.lock().await.status()
    }
}

/// Immutable mapping from service name to managed service.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<ServiceName, Arc<ManagedService>>,
}

impl ServiceRegistry {
    /// Build the registry from the services configured at startup.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateServiceName`] if two services share
    /// a name.
    pub fn new(services: impl IntoIterator<Item = Service>) -> Result<Self, ValidationError> {
        let mut map = HashMap::new();
        for service in services {
            let name = service.name().clone();
            if map.contains_key(&name) {
                return Err(ValidationError::DuplicateServiceName(name.to_string()));
            }
            map.insert(name, Arc::new(ManagedService::new(service)));
        }
        Ok(Self { services: map })
    }

    /// Resolve a service by name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if no service with that name is registered.
    pub fn lookup(&self, name: &ServiceName) -> Result<Arc<ManagedService>, NotFoundError> {
        self.services
            .get(name)
            .cloned()
            .ok_or_else(|| NotFoundError {
                entity: "service",
                name: name.to_string(),
            })
    }

    /// Iterate over every registered service, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ManagedService>> {
        self.services.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
