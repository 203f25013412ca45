// Controllers are usually declared through macros:
// - #[controller] on the struct (name, auth marker, DI injection)
// - #[actions] on the impl block (every `pub fn(&self ..)` becomes an action)
//
// Both expand to the `Controller` trait below; implementing it by hand works the same.
mod registry;

pub use registry::{ControllerRegistry, ControllerRegistryBuilder};

use crate::di::{Container, Injectable};
use crate::error::{MvcError, Result};
use crate::params::Params;
use crate::result::{ActionResult, IntoActionResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type AnyArc = Arc<dyn Any + Send + Sync>;
type ActionFn<C> = Arc<dyn Fn(&C, Option<Params>) -> Result<ActionResult> + Send + Sync>;
type ErasedActionFn =
    Arc<dyn Fn(&(dyn Any + Send + Sync), Option<Params>) -> Result<ActionResult> + Send + Sync>;
type Factory = Arc<dyn Fn(&Container) -> Result<AnyArc> + Send + Sync>;

/// A type whose actions are reachable through `/<NAME>/<action>/...`.
pub trait Controller: Injectable {
    /// Registry key and first path segment.
    const NAME: &'static str;
    /// Module the controller is declared in; the registry keeps only those
    /// living in the configured controller namespace.
    const MODULE_PATH: &'static str;
    /// Every action of this controller requires an authenticated identity.
    const REQUIRES_AUTH: bool = false;

    fn actions() -> Vec<Action<Self>>;
}

/// Whether an action takes the parameter bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Params,
}

/// A typed action of controller `C`.
pub struct Action<C> {
    name: String,
    requires_auth: bool,
    arity: Arity,
    handler: ActionFn<C>,
}

impl<C: 'static> Action<C> {
    /// An action that takes no parameters.
    pub fn new<F, R>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&C) -> R + Send + Sync + 'static,
        R: IntoActionResult,
    {
        Self {
            name: name.into(),
            requires_auth: false,
            arity: Arity::None,
            handler: Arc::new(move |controller: &C, _: Option<Params>| {
                handler(controller).into_action_result()
            }),
        }
    }

    /// An action that receives the request's [`Params`].
    pub fn with_params<F, R>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&C, Params) -> R + Send + Sync + 'static,
        R: IntoActionResult,
    {
        let name = name.into();
        let missing = name.clone();
        Self {
            name,
            requires_auth: false,
            arity: Arity::Params,
            handler: Arc::new(move |controller: &C, params: Option<Params>| match params {
                Some(params) => handler(controller, params).into_action_result(),
                None => Err(MvcError::Internal(format!(
                    "action {missing} invoked without parameters"
                ))),
            }),
        }
    }

    /// Require an authenticated identity for this action.
    pub fn authorize(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Type-erased action, as stored in the registry.
#[derive(Clone)]
pub struct ActionDescriptor {
    name: String,
    requires_auth: bool,
    arity: Arity,
    handler: ErasedActionFn,
}

impl ActionDescriptor {
    fn erase<C: Send + Sync + 'static>(action: Action<C>) -> Self {
        let typed = action.handler;
        let handler: ErasedActionFn =
            Arc::new(move |instance: &(dyn Any + Send + Sync), params: Option<Params>| {
                let controller =
                    instance
                        .downcast_ref::<C>()
                        .ok_or_else(|| MvcError::DowncastFailed {
                            type_name: std::any::type_name::<C>().to_string(),
                        })?;
                typed(controller, params)
            });
        Self {
            name: action.name,
            requires_auth: action.requires_auth,
            arity: action.arity,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Run the action against an instance produced by the owning controller's factory.
    pub fn call(
        &self,
        instance: &(dyn Any + Send + Sync),
        params: Option<Params>,
    ) -> Result<ActionResult> {
        (self.handler)(instance, params)
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("name", &self.name)
            .field("requires_auth", &self.requires_auth)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Everything the middleware needs to know about one controller.
#[derive(Clone)]
pub struct ControllerDescriptor {
    name: String,
    module_path: String,
    requires_auth: bool,
    factory: Factory,
    actions: Vec<ActionDescriptor>,
}

impl ControllerDescriptor {
    pub fn of<C: Controller>() -> Self {
        let factory: Factory = Arc::new(|container: &Container| {
            container
                .resolve_or_inject::<C>()
                .map(|instance| instance as AnyArc)
        });
        Self {
            name: C::NAME.to_string(),
            module_path: C::MODULE_PATH.to_string(),
            requires_auth: C::REQUIRES_AUTH,
            factory,
            actions: C::actions().into_iter().map(ActionDescriptor::erase).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// First action with exactly this name.
    pub fn action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|action| action.name == name)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.action(name).is_some()
    }

    /// Resolve a controller instance through the container.
    pub fn instantiate(&self, container: &Container) -> Result<AnyArc> {
        (self.factory)(container)
    }

    /// Whether this controller lives in a module whose last segment is `namespace`.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.module_path
            .rsplit("::")
            .next()
            .is_some_and(|last| last.eq_ignore_ascii_case(namespace))
    }
}

impl fmt::Debug for ControllerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDescriptor")
            .field("name", &self.name)
            .field("module_path", &self.module_path)
            .field("requires_auth", &self.requires_auth)
            .field("actions", &self.actions)
            .finish()
    }
}
