//! Service registry scanned for contributed actions

use crate::managed::Pojo;

/// Supplies the service instances whose actions may be contributed to
/// other types
pub trait ServiceRegistry: Send + Sync {
    /// Current service instances
    fn services(&self) -> Vec<Pojo>;
}

/// A fixed list of services
#[derive(Debug, Clone, Default)]
pub struct StaticServiceRegistry {
    services: Vec<Pojo>,
}

impl StaticServiceRegistry {
    /// Create a registry holding `services`
    pub fn new(services: Vec<Pojo>) -> Self {
        Self { services }
    }

    /// Add a service
    pub fn with(mut self, service: Pojo) -> Self {
        self.services.push(service);
        self
    }

    /// Number of services
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// True if there are no services
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceRegistry for StaticServiceRegistry {
    fn services(&self) -> Vec<Pojo> {
        self.services.clone()
    }
}

/// A registry with no services
#[derive(Debug, Clone, Copy, Default)]
pub struct NoServices;

impl ServiceRegistry for NoServices {
    fn services(&self) -> Vec<Pojo> {
        Vec::new()
    }
}
