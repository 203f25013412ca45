use super::{Controller, ControllerDescriptor};
use crate::error::{MvcError, Result};
use std::collections::{HashMap, HashSet};

/// Name → controller lookup, built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, ControllerDescriptor>,
}

impl ControllerRegistry {
    pub fn builder() -> ControllerRegistryBuilder {
        ControllerRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&ControllerDescriptor> {
        self.controllers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.controllers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

/// Collects controller candidates and validates them into a [`ControllerRegistry`].
///
/// # Example
/// ```ignore
/// let registry = ControllerRegistry::builder()
///     .controller::<HomeController>()
///     .controller::<AccountController>()
///     .build()?;
/// ```
pub struct ControllerRegistryBuilder {
    namespace: String,
    candidates: Vec<ControllerDescriptor>,
}

impl ControllerRegistryBuilder {
    pub fn new() -> Self {
        Self {
            namespace: "controllers".to_string(),
            candidates: Vec::new(),
        }
    }

    /// Module segment that marks controller modules (default `controllers`).
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn controller<C: Controller>(self) -> Self {
        self.register(ControllerDescriptor::of::<C>())
    }

    pub fn register(mut self, descriptor: ControllerDescriptor) -> Self {
        self.candidates.push(descriptor);
        self
    }

    /// Keep candidates from the controller namespace and index them by name.
    ///
    /// # Errors
    /// Fails on two controllers sharing a name or one controller declaring the
    /// same action name twice.
    pub fn build(self) -> Result<ControllerRegistry> {
        let mut controllers = HashMap::with_capacity(self.candidates.len());

        for descriptor in self.candidates {
            if !descriptor.in_namespace(&self.namespace) {
                tracing::debug!(
                    controller = descriptor.name(),
                    module = descriptor.module_path(),
                    namespace = %self.namespace,
                    "skipping controller outside the controller namespace"
                );
                continue;
            }

            let mut seen = HashSet::new();
            for action in descriptor.actions() {
                if !seen.insert(action.name()) {
                    return Err(MvcError::DuplicateAction {
                        controller: descriptor.name().to_string(),
                        action: action.name().to_string(),
                    });
                }
            }

            let name = descriptor.name().to_string();
            if controllers.contains_key(&name) {
                return Err(MvcError::DuplicateController { name });
            }
            tracing::debug!(
                controller = %name,
                actions = descriptor.actions().len(),
                "registered controller"
            );
            controllers.insert(name, descriptor);
        }

        if controllers.is_empty() {
            tracing::warn!(namespace = %self.namespace, "no controllers registered");
        }

        Ok(ControllerRegistry { controllers })
    }
}

impl Default for ControllerRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
