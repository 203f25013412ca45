//! # simplemvc
//!
//! Convention-based MVC routing for tower/axum applications.
//!
//! Requests are mapped to controllers and actions by name: the first path segment
//! picks the controller, the HTTP verb plus the second segment picks the action
//! (`GET /Blog/archive` → `Blog::GetArchive`), and the remaining segments become
//! positional parameters (`Param1`, `Param2`, …). Actions return a redirect, raw
//! bytes, or a view model rendered through `Views/<Controller>/<Action>.html`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simplemvc::prelude::*;
//!
//! pub mod controllers {
//!     use simplemvc::prelude::*;
//!
//!     #[controller]
//!     pub struct HomeController;
//!
//!     #[actions]
//!     impl HomeController {
//!         // GET / and GET /Home
//!         pub fn get_index(&self) -> View<&'static str> {
//!             View("hello")
//!         }
//!
//!         // POST /Home/greet/<name>
//!         pub fn post_greet(&self, params: Params) -> Redirect {
//!             Redirect::to(format!("/Home/{}", params.positional(1).unwrap_or("index")))
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> simplemvc::Result<()> {
//!     let app = MvcApplication::builder()
//!         .controller::<controllers::HomeController>()
//!         .build()?;
//!
//!     let service = MvcLayer::new(app).layer(Router::new());
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     axum::serve(listener, service.into_make_service()).await.unwrap();
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod auth;
pub mod config;
pub mod controller;
pub mod di;
pub mod error;
pub mod invoke;
pub mod middleware;
pub mod params;
pub mod result;
pub mod routing;
pub mod view;
pub mod worker;

// Re-export core types
pub use application::{MvcApplication, MvcApplicationBuilder};
pub use auth::{Authenticator, Identity};
pub use config::{ConfigService, MvcOptions};
pub use controller::{Action, Controller, ControllerDescriptor, ControllerRegistry};
pub use di::{Container, ContainerBuilder, Injectable};
pub use error::{MvcError, Result};
pub use middleware::{MvcLayer, MvcMiddleware};
pub use params::{Params, RequestContext};
pub use result::{ActionResult, IntoActionResult, Redirect, View};
pub use view::{SubstitutionRenderer, TemplateRenderer};

// Re-export macros
pub use simplemvc_macro::{Injectable as DeriveInjectable, actions, authorize, controller};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use simplemvc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::application::{MvcApplication, MvcApplicationBuilder};
    pub use crate::auth::{Anonymous, Authenticator, Identity};
    pub use crate::config::{ConfigService, MvcOptions};
    pub use crate::controller::{Action, Controller, ControllerRegistry};
    pub use crate::di::{Container, ContainerBuilder, Injectable};
    pub use crate::error::{MvcError, Result};
    pub use crate::middleware::MvcLayer;
    pub use crate::params::{Params, RequestContext};
    pub use crate::result::{ActionResult, Redirect, View};
    pub use crate::view::{SubstitutionRenderer, TemplateRenderer};
    pub use crate::{DeriveInjectable as Injectable, actions, authorize, controller};
    pub use async_trait::async_trait;
    pub use axum::{Router, ServiceExt, http::StatusCode};
    pub use std::sync::Arc;
    pub use tower::Layer;
}
