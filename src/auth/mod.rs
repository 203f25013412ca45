use crate::controller::ControllerRegistry;
use crate::routing::MvcQuery;
use async_trait::async_trait;
use axum::http::request::Parts;
use std::collections::HashMap;

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub scheme: String,
    pub claims: HashMap<String, String>,
}

impl Identity {
    pub fn new(name: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
            claims: HashMap::new(),
        }
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    pub fn claim(&self, key: &str) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }
}

/// Looks up the identity attached to a request under a named scheme.
///
/// Only consulted for controllers or actions that require authentication.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    async fn authenticate(&self, request: &Parts, scheme: &str) -> Option<Identity>;
}

#[async_trait]
impl<F> Authenticator for F
where
    F: Fn(&Parts, &str) -> Option<Identity> + Send + Sync + 'static,
{
    async fn authenticate(&self, request: &Parts, scheme: &str) -> Option<Identity> {
        self(request, scheme)
    }
}

/// Authenticator that never finds an identity; protected actions always get 403.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl Authenticator for Anonymous {
    async fn authenticate(&self, _request: &Parts, _scheme: &str) -> Option<Identity> {
        None
    }
}

/// Result of the authentication gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// Continue; carries the identity when one was required and found.
    Allow(Option<Identity>),
    Deny,
}

/// Check the auth markers of the resolved controller/action.
///
/// Unknown controllers or actions pass, so the invoker can report the miss.
pub async fn authenticate(
    query: &MvcQuery,
    registry: &ControllerRegistry,
    request: &Parts,
    authenticator: &dyn Authenticator,
    scheme: &str,
) -> AuthDecision {
    let Some(controller) = query.controller().and_then(|name| registry.get(name)) else {
        return AuthDecision::Allow(None);
    };
    let Some(action) = query.action().and_then(|name| controller.action(name)) else {
        return AuthDecision::Allow(None);
    };

    if !controller.requires_auth() && !action.requires_auth() {
        return AuthDecision::Allow(None);
    }

    match authenticator.authenticate(request, scheme).await {
        Some(identity) => AuthDecision::Allow(Some(identity)),
        None => {
            tracing::debug!(
                controller = controller.name(),
                action = action.name(),
                scheme,
                "no identity for protected action"
            );
            AuthDecision::Deny
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Action, Controller};
    use crate::di::{Container, Injectable};
    use crate::error::Result;
    use axum::http::{Request, header};

    struct Admin;

    impl Injectable for Admin {
        fn inject(_: &Container) -> Result<Self> {
            Ok(Admin)
        }
    }

    impl Controller for Admin {
        const NAME: &'static str = "Admin";
        const MODULE_PATH: &'static str = "app::controllers";
        const REQUIRES_AUTH: bool = true;

        fn actions() -> Vec<Action<Self>> {
            vec![Action::new("GetIndex", |_: &Admin| ())]
        }
    }

    struct Blog;

    impl Injectable for Blog {
        fn inject(_: &Container) -> Result<Self> {
            Ok(Blog)
        }
    }

    impl Controller for Blog {
        const NAME: &'static str = "Blog";
        const MODULE_PATH: &'static str = "app::controllers";

        fn actions() -> Vec<Action<Self>> {
            vec![
                Action::new("GetIndex", |_: &Blog| ()),
                Action::new("GetEdit", |_: &Blog| ()).authorize(),
            ]
        }
    }

    fn registry() -> ControllerRegistry {
        ControllerRegistry::builder()
            .controller::<Admin>()
            .controller::<Blog>()
            .build()
            .unwrap()
    }

    fn cookie_auth(parts: &Parts, scheme: &str) -> Option<Identity> {
        parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("user="))
            .map(|user| Identity::new(user, scheme))
    }

    fn parts(path: &str, cookie: Option<&str>) -> Parts {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    async fn decide(path: &str, cookie: Option<&str>) -> AuthDecision {
        let registry = registry();
        let request = parts(path, cookie);
        let query = MvcQuery::parse(&request, &[], &registry, &Default::default());
        authenticate(&query, &registry, &request, &cookie_auth, "Cookie").await
    }

    #[tokio::test]
    async fn test_unprotected_action_passes_without_lookup() {
        assert_eq!(decide("/Blog", None).await, AuthDecision::Allow(None));
    }

    #[tokio::test]
    async fn test_protected_action() {
        assert_eq!(decide("/Blog/Edit", None).await, AuthDecision::Deny);
        assert_eq!(
            decide("/Blog/Edit", Some("user=ada")).await,
            AuthDecision::Allow(Some(Identity::new("ada", "Cookie")))
        );
    }

    #[tokio::test]
    async fn test_protected_controller() {
        assert_eq!(decide("/Admin", None).await, AuthDecision::Deny);
        assert!(matches!(
            decide("/Admin", Some("user=root")).await,
            AuthDecision::Allow(Some(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_targets_pass() {
        // unregistered default controller and unregistered path
        assert_eq!(decide("/", None).await, AuthDecision::Allow(None));
        assert_eq!(decide("/Nope", None).await, AuthDecision::Allow(None));
    }

    #[tokio::test]
    async fn test_anonymous_denies_protected() {
        let registry = registry();
        let request = parts("/Admin", Some("user=root"));
        let query = MvcQuery::parse(&request, &[], &registry, &Default::default());
        let decision = authenticate(&query, &registry, &request, &Anonymous, "Cookie").await;
        assert_eq!(decision, AuthDecision::Deny);
    }
}
