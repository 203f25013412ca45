use crate::di::{Container, Injectable};
use crate::error::Result;
use std::sync::Arc;

/// Builder for the dependency injection container
///
/// Collects services before the container is frozen into an [`MvcApplication`](crate::MvcApplication).
///
/// # Example
/// ```
/// use simplemvc::ContainerBuilder;
///
/// struct Database;
///
/// let container = ContainerBuilder::new().register(Database).build();
/// assert_eq!(container.len(), 1);
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a service instance
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Build `T` from what is registered so far and register the result.
    pub fn provide<T: Injectable>(mut self) -> Result<Self> {
        let instance = T::inject(&self.container)?;
        self.container.register(instance);
        Ok(self)
    }

    /// Bind a trait to a concrete implementation
    ///
    /// Enables resolving `Arc<dyn Trait>` to the registered implementation.
    pub fn bind<Trait, Impl, F>(mut self, caster: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        self.container.register_trait::<Trait, Impl, F>(caster);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Repo(u32);

    struct Service {
        repo: Arc<Repo>,
    }

    impl Injectable for Service {
        fn inject(container: &Container) -> Result<Self> {
            Ok(Self {
                repo: container.resolve()?,
            })
        }
    }

    #[test]
    fn test_provide_uses_earlier_registrations() {
        let container = ContainerBuilder::new()
            .register(Repo(7))
            .provide::<Service>()
            .unwrap()
            .build();
        assert_eq!(container.resolve::<Service>().unwrap().repo.0, 7);
    }

    #[test]
    fn test_provide_fails_without_dependency() {
        assert!(ContainerBuilder::new().provide::<Service>().is_err());
    }
}
