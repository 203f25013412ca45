use crate::di::Injectable;
use crate::error::{MvcError, Result};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

type AnyArc = Arc<dyn Any + Send + Sync>;

/// Casts a registered implementation into an `Arc<dyn Any>` wrapping an `Arc<dyn Trait>`.
/// Returns `None` when the stored instance is not the expected implementation.
type CasterFn = Arc<dyn Fn(AnyArc) -> Option<AnyArc> + Send + Sync>;

/// Thread-safe dependency injection container.
///
/// Filled during startup, then shared read-only by every request. Controllers are
/// resolved from it on each invocation: a registered instance is reused, otherwise
/// the controller is built through [`Injectable::inject`].
pub struct Container {
    services: DashMap<TypeId, AnyArc>,
    trait_mappings: DashMap<TypeId, TypeId>,
    casters: DashMap<TypeId, CasterFn>,
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            services: self.services.clone(),
            trait_mappings: self.trait_mappings.clone(),
            casters: self.casters.clone(),
        }
    }
}

impl Container {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
            trait_mappings: DashMap::new(),
            casters: DashMap::new(),
        }
    }

    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.services.insert(TypeId::of::<T>(), Arc::new(instance));
        self
    }

    pub fn register_trait<Trait, Impl, F>(&mut self, caster_fn: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        let trait_id = TypeId::of::<Trait>();
        self.trait_mappings.insert(trait_id, TypeId::of::<Impl>());

        let caster: CasterFn = Arc::new(move |instance: AnyArc| {
            let concrete = instance.downcast::<Impl>().ok()?;
            let trait_obj: Arc<Trait> = caster_fn(concrete);
            Some(Arc::new(trait_obj) as AnyArc)
        });

        self.casters.insert(trait_id, caster);
        self
    }

    pub fn resolve<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let entry = self
            .services
            .get(&TypeId::of::<T>())
            .ok_or_else(|| MvcError::DependencyNotFound {
                type_name: std::any::type_name::<T>().to_string(),
            })?;
        entry
            .value()
            .clone()
            .downcast::<T>()
            .map_err(|_| MvcError::DowncastFailed {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn resolve_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let requested = TypeId::of::<T>();
        let not_found = || MvcError::DependencyNotFound {
            type_name: std::any::type_name::<T>().to_string(),
        };

        let caster = self.casters.get(&requested).ok_or_else(not_found)?;
        let impl_id = self.trait_mappings.get(&requested).ok_or_else(not_found)?;
        let entry = self.services.get(impl_id.value()).ok_or_else(not_found)?;

        let downcast_failed = || MvcError::DowncastFailed {
            type_name: std::any::type_name::<T>().to_string(),
        };
        let wrapper = (caster.value())(entry.value().clone())
            .ok_or_else(downcast_failed)?
            .downcast::<Arc<T>>()
            .map_err(|_| downcast_failed())?;
        Ok(wrapper.as_ref().clone())
    }

    /// Resolve `T` if an instance was registered, otherwise build a fresh one.
    pub fn resolve_or_inject<T: Injectable>(&self) -> Result<Arc<T>> {
        match self.resolve::<T>() {
            Ok(instance) => Ok(instance),
            Err(MvcError::DependencyNotFound { .. }) => T::inject(self).map(Arc::new),
            Err(e) => Err(e),
        }
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.services.contains_key(&type_id) || self.trait_mappings.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
