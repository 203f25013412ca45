use crate::application::MvcApplication;
use crate::controller::Arity;
use crate::error::Result;
use crate::params::{Params, RequestContext};
use crate::result::ActionResult;
use crate::routing::MvcQuery;

/// What happened when the resolved action was looked up and run.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// No such controller or action; the request belongs to the next handler.
    NotHandled,
    Completed(ActionResult),
}

/// Resolve the controller through the container and run the action on the worker pool.
///
/// # Errors
/// Dependency resolution failures, action errors and action panics.
pub async fn invoke(
    app: &MvcApplication,
    query: &MvcQuery,
    context: RequestContext,
) -> Result<InvocationOutcome> {
    let Some(controller) = query.controller().and_then(|name| app.registry().get(name)) else {
        return Ok(InvocationOutcome::NotHandled);
    };
    let Some(action) = query.action().and_then(|name| controller.action(name)) else {
        tracing::debug!(
            controller = controller.name(),
            action = query.action().unwrap_or_default(),
            "no such action"
        );
        return Ok(InvocationOutcome::NotHandled);
    };

    let instance = app.container_instance(controller)?;
    let params = match action.arity() {
        Arity::None => None,
        Arity::Params => Some(Params::new(query.parameters().iter(), context)),
    };

    let action = action.clone();
    let controller_name = controller.name().to_string();
    let result = app
        .workers()
        .execute(move || action.call(instance.as_ref(), params))
        .await?
        .map_err(|e| e.in_action(&controller_name, query.action().unwrap_or_default()))?;

    Ok(InvocationOutcome::Completed(result))
}
