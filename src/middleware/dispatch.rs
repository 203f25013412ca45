use crate::application::MvcApplication;
use crate::error::{MvcError, Result};
use crate::result::{ActionResult, Redirect};
use crate::view::load_view;
use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use bytes::Bytes;
use std::sync::Arc;

/// Turn an action result into the response for `controller`/`action`.
///
/// Views are read and rendered on the worker pool.
///
/// # Errors
/// A missing or unreadable view, a render failure, or an invalid redirect target.
pub async fn dispatch(
    app: &MvcApplication,
    controller: &str,
    action: &str,
    result: ActionResult,
) -> Result<Response> {
    tracing::debug!(controller, action, kind = result.kind(), "dispatching action result");

    match result {
        ActionResult::Redirect(target) => redirect(&target),
        ActionResult::RawBytes(data) => Ok(raw(data)),
        ActionResult::ViewModel(model) => {
            let options = app.options().clone();
            let renderer = Arc::clone(app.renderer());
            let (controller, action) = (controller.to_string(), action.to_string());

            let html = app
                .workers()
                .execute(move || {
                    let template = load_view(&options, &controller, &action)?;
                    renderer.render(&template, &model)
                })
                .await??;
            Ok(Html(html).into_response())
        }
    }
}

fn redirect(target: &Redirect) -> Result<Response> {
    let location = HeaderValue::try_from(target.target())
        .map_err(|e| MvcError::Internal(format!("invalid redirect target '{target}': {e}")))?;
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

fn raw(data: Bytes) -> Response {
    Response::new(Body::from(data))
}
