mod dispatch;

pub use dispatch::dispatch;

use crate::application::MvcApplication;
use crate::auth::{AuthDecision, authenticate};
use crate::error::MvcError;
use crate::invoke::{InvocationOutcome, invoke};
use crate::params::RequestContext;
use crate::routing::{MvcQuery, is_form_request, read_form};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};

/// Tower layer that serves convention-routed controllers in front of `inner`.
///
/// Requests that do not resolve to a registered controller action reach the
/// wrapped service untouched.
#[derive(Clone)]
pub struct MvcLayer {
    app: Arc<MvcApplication>,
}

impl MvcLayer {
    pub fn new(app: MvcApplication) -> Self {
        Self { app: Arc::new(app) }
    }

    pub fn from_shared(app: Arc<MvcApplication>) -> Self {
        Self { app }
    }
}

impl<S> Layer<S> for MvcLayer {
    type Service = MvcMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MvcMiddleware {
            inner,
            app: self.app.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MvcMiddleware<S> {
    inner: S,
    app: Arc<MvcApplication>,
}

impl<S> Service<Request<Body>> for MvcMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let app = self.app.clone();
        // keep the service that was polled ready for this call
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(handle(app, request, inner))
    }
}

async fn handle<S>(
    app: Arc<MvcApplication>,
    request: Request<Body>,
    mut inner: S,
) -> Result<Response, S::Error>
where
    S: Service<Request<Body>, Response = Response>,
{
    let started = Instant::now();
    let (parts, body) = request.into_parts();

    // controller and action never depend on the form, so resolve them and run the
    // auth gate before any body is buffered
    let route = MvcQuery::parse(&parts, &[], app.registry(), app.options());
    let (Some(controller), Some(action)) = (route.controller(), route.action()) else {
        tracing::trace!(path = parts.uri.path(), "no controller, passing on");
        return inner.call(Request::from_parts(parts, body)).await;
    };
    if !app
        .registry()
        .get(controller)
        .is_some_and(|descriptor| descriptor.has_action(action))
    {
        tracing::debug!(controller, action, "action not found, passing on");
        return inner.call(Request::from_parts(parts, body)).await;
    }

    let identity = match authenticate(
        &route,
        app.registry(),
        &parts,
        app.authenticator(),
        &app.options().auth_scheme,
    )
    .await
    {
        AuthDecision::Allow(identity) => identity,
        AuthDecision::Deny => {
            tracing::info!(controller, action, "rejected unauthenticated request");
            return Ok(unauthorized());
        }
    };

    let (with_form, body) = if is_form_request(&parts.headers) {
        match read_form(body, app.options().max_form_bytes).await {
            Ok(form) => (
                Some(MvcQuery::parse(&parts, &form.fields, app.registry(), app.options())),
                Body::from(form.raw),
            ),
            Err(e) => return Ok(failure(&parts.uri, e)),
        }
    } else {
        (None, body)
    };
    let query = with_form.as_ref().unwrap_or(&route);

    let context = RequestContext::new(&parts, controller, action, identity);
    let result = match invoke(&app, query, context).await {
        Ok(InvocationOutcome::Completed(result)) => result,
        Ok(InvocationOutcome::NotHandled) => {
            tracing::debug!(controller, action, "action not found, passing on");
            return inner.call(Request::from_parts(parts, body)).await;
        }
        Err(e) => return Ok(failure(&parts.uri, e)),
    };

    let response = match dispatch(&app, controller, action, result).await {
        Ok(response) => response,
        Err(e) => failure(&parts.uri, e),
    };

    tracing::debug!(
        method = %parts.method,
        uri = %parts.uri,
        controller,
        action,
        status = response.status().as_u16(),
        elapsed = ?started.elapsed(),
        "handled"
    );
    Ok(response)
}

fn unauthorized() -> Response {
    (
        StatusCode::FORBIDDEN,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Unauthorized",
    )
        .into_response()
}

fn failure(uri: &axum::http::Uri, error: MvcError) -> Response {
    tracing::error!(%uri, error = %error, "MVC request failed");
    error.into_response()
}
