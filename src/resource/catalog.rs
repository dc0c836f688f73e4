use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::Resource;
use crate::registry::{CapabilityRegistry, Role};

/// Builds a fresh resource for one dispatch.
pub type ResourceFactory = Arc<dyn Fn() -> Box<dyn Resource> + Send + Sync>;

/// Where the dispatcher gets its resource from.
pub enum HandlerSource {
    /// Look the name up in the catalog through the `model` role
    Named(String),
    /// Use this instance as-is; `name` is its short name
    Instance {
        name: String,
        resource: Box<dyn Resource>,
    },
}

impl HandlerSource {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            HandlerSource::Named(name) => name,
            HandlerSource::Instance { name, .. } => name,
        }
    }
}

impl fmt::Debug for HandlerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerSource::Named(name) => f.debug_tuple("Named").field(name).finish(),
            HandlerSource::Instance { name, .. } => f
                .debug_struct("Instance")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}

/// Resource types known by name.
///
/// Names are stored as `model` capability identifiers, so `Test`, `test` and
/// `TEST` all resolve to the same type.
#[derive(Clone)]
pub struct ResourceCatalog {
    registry: CapabilityRegistry,
    factories: HashMap<String, (String, ResourceFactory)>,
}

impl fmt::Debug for ResourceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCatalog")
            .field("resources", &self.names())
            .finish()
    }
}

impl ResourceCatalog {
    #[must_use]
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self {
            registry,
            factories: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Resource> + Send + Sync + 'static,
    {
        let id = self.registry.capability_id(Role::Model, name);
        info!(resource = %name, model = %id, "Resource registered");
        self.factories
            .insert(id, (name.to_lowercase(), Arc::new(factory)));
    }

    #[must_use]
    pub fn with<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Resource> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Construct the resource registered under `name`.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<Box<dyn Resource>> {
        let id = self.registry.capability_id(Role::Model, name);
        let found = self.factories.get(&id);
        debug!(resource = %name, model = %id, found = found.is_some(), "Resource lookup");
        found.map(|(_, factory)| factory())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories
            .contains_key(&self.registry.capability_id(Role::Model, name))
    }

    /// Registered short names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.values().map(|(n, _)| n.clone()).collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{MethodSet, RestMethod};

    struct Probe;

    impl Resource for Probe {
        fn methods(&self) -> MethodSet {
            MethodSet::empty().with(RestMethod::Get)
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = ResourceCatalog::new(CapabilityRegistry::new())
            .with("Probe", || Box::new(Probe) as Box<dyn Resource>);
        assert!(catalog.contains("probe"));
        assert!(catalog.create("PROBE").is_some());
        assert!(catalog.create("missing").is_none());
        assert_eq!(catalog.names(), vec!["probe".to_string()]);
    }

    #[test]
    fn test_handler_source_name() {
        let named = HandlerSource::Named("test".to_string());
        assert_eq!(named.name(), "test");
        let inst = HandlerSource::Instance {
            name: "probe".to_string(),
            resource: Box::new(Probe),
        };
        assert_eq!(inst.name(), "probe");
        assert!(format!("{inst:?}").contains("probe"));
    }
}
