//! Application context
//!
//! Everything the middleware reads per request, assembled once at startup.

use crate::auth::{Anonymous, Authenticator};
use crate::config::MvcOptions;
use crate::controller::{Controller, ControllerDescriptor, ControllerRegistry};
use crate::di::Container;
use crate::error::Result;
use crate::view::{SubstitutionRenderer, TemplateRenderer};
use crate::worker::WorkerPool;
use std::any::Any;
use std::sync::Arc;

/// Registry, container, collaborators and options shared by all requests.
///
/// # Example
///
/// ```rust,ignore
/// let app = MvcApplication::builder()
///     .options(MvcOptions::from_env()?)
///     .container(container)
///     .controller::<HomeController>()
///     .authenticator(cookie_authenticator)
///     .build()?;
///
/// let service = MvcLayer::new(app).layer(Router::new());
/// ```
pub struct MvcApplication {
    registry: ControllerRegistry,
    container: Container,
    renderer: Arc<dyn TemplateRenderer>,
    authenticator: Arc<dyn Authenticator>,
    options: MvcOptions,
    workers: WorkerPool,
}

impl MvcApplication {
    pub fn builder() -> MvcApplicationBuilder {
        MvcApplicationBuilder::new()
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn renderer(&self) -> &Arc<dyn TemplateRenderer> {
        &self.renderer
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn options(&self) -> &MvcOptions {
        &self.options
    }

    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    pub(crate) fn container_instance(
        &self,
        controller: &ControllerDescriptor,
    ) -> Result<Arc<dyn Any + Send + Sync>> {
        controller.instantiate(&self.container)
    }
}

/// Builder for [`MvcApplication`].
pub struct MvcApplicationBuilder {
    options: MvcOptions,
    container: Option<Container>,
    controllers: Vec<ControllerDescriptor>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    workers: Option<WorkerPool>,
}

impl MvcApplicationBuilder {
    pub fn new() -> Self {
        Self {
            options: MvcOptions::default(),
            container: None,
            controllers: Vec::new(),
            renderer: None,
            authenticator: None,
            workers: None,
        }
    }

    pub fn options(mut self, options: MvcOptions) -> Self {
        self.options = options;
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    pub fn controller<C: Controller>(mut self) -> Self {
        self.controllers.push(ControllerDescriptor::of::<C>());
        self
    }

    pub fn descriptor(mut self, descriptor: ControllerDescriptor) -> Self {
        self.controllers.push(descriptor);
        self
    }

    pub fn renderer(mut self, renderer: impl TemplateRenderer) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn authenticator(mut self, authenticator: impl Authenticator) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Share an existing pool instead of starting one sized from the options.
    pub fn worker_pool(mut self, workers: WorkerPool) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.options.worker_threads = Some(threads);
        self
    }

    /// Validate the controllers and start the worker pool.
    ///
    /// # Errors
    /// Duplicate controller/action names, or a pool that fails to start.
    pub fn build(self) -> Result<MvcApplication> {
        let registry = self
            .controllers
            .into_iter()
            .fold(
                ControllerRegistry::builder().namespace(self.options.controller_namespace.clone()),
                |builder, descriptor| builder.register(descriptor),
            )
            .build()?;

        let workers = match self.workers {
            Some(workers) => workers,
            None => match self.options.worker_threads {
                Some(threads) => WorkerPool::new(threads)?,
                None => WorkerPool::with_default_size()?,
            },
        };

        tracing::info!(
            controllers = registry.len(),
            workers = workers.num_threads(),
            views = %self.options.views_root.display(),
            "MVC application ready"
        );

        Ok(MvcApplication {
            registry,
            container: self.container.unwrap_or_default(),
            renderer: self
                .renderer
                .unwrap_or_else(|| Arc::new(SubstitutionRenderer)),
            authenticator: self.authenticator.unwrap_or_else(|| Arc::new(Anonymous)),
            options: self.options,
            workers,
        })
    }
}

impl Default for MvcApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
