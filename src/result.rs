//! Values returned by controller actions.

use crate::controller::Controller;
use crate::error::{MvcError, Result};
use bytes::Bytes;
use serde::Serialize;
use std::any::Any;
use std::fmt;

/// What an action produced. The dispatcher turns each case into a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// Respond with `302 Found` pointing at the target.
    Redirect(Redirect),
    /// Write the bytes as the response body, no template involved.
    RawBytes(Bytes),
    /// Render the action's view with this model. `Null` for actions returning nothing.
    ViewModel(serde_json::Value),
}

impl ActionResult {
    pub fn kind(&self) -> &'static str {
        match self {
            ActionResult::Redirect(_) => "redirect",
            ActionResult::RawBytes(_) => "raw",
            ActionResult::ViewModel(_) => "view",
        }
    }
}

const VERB_PREFIXES: [&str; 5] = ["Get", "Post", "Put", "Delete", "Patch"];

/// A redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    target: String,
}

impl Redirect {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Link to an action of controller `C`, following the routing convention.
    ///
    /// Parameters are percent-encoded, one path segment each.
    ///
    /// ```
    /// use simplemvc::{Action, Controller, Redirect};
    /// # use simplemvc::{Container, Injectable, Result};
    /// # struct Blog;
    /// # impl Injectable for Blog { fn inject(_: &Container) -> Result<Self> { Ok(Blog) } }
    /// # impl Controller for Blog {
    /// #     const NAME: &'static str = "Blog";
    /// #     const MODULE_PATH: &'static str = "app::controllers";
    /// #     fn actions() -> Vec<Action<Self>> { Vec::new() }
    /// # }
    /// let redirect = Redirect::to_action::<Blog>("GetPost", &[2024, 7]);
    /// assert_eq!(redirect.target(), "/Blog/Post/2024/7");
    /// ```
    pub fn to_action<C: Controller>(action: &str, params: &[impl fmt::Display]) -> Self {
        let segment = VERB_PREFIXES
            .iter()
            .find_map(|verb| action.strip_prefix(verb))
            .unwrap_or(action);

        let mut target = format!("/{}/{}", C::NAME, segment);
        for param in params {
            target.push('/');
            target.push_str(&urlencoding::encode(&param.to_string()));
        }
        Self { target }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target)
    }
}

/// A serializable view model.
pub struct View<T>(pub T);

/// Conversion from an action's return value.
pub trait IntoActionResult {
    fn into_action_result(self) -> Result<ActionResult>;
}

impl IntoActionResult for ActionResult {
    fn into_action_result(self) -> Result<ActionResult> {
        Ok(self)
    }
}

impl IntoActionResult for Redirect {
    fn into_action_result(self) -> Result<ActionResult> {
        Ok(ActionResult::Redirect(self))
    }
}

impl IntoActionResult for Vec<u8> {
    fn into_action_result(self) -> Result<ActionResult> {
        Ok(ActionResult::RawBytes(Bytes::from(self)))
    }
}

impl IntoActionResult for Bytes {
    fn into_action_result(self) -> Result<ActionResult> {
        Ok(ActionResult::RawBytes(self))
    }
}

impl IntoActionResult for () {
    fn into_action_result(self) -> Result<ActionResult> {
        Ok(ActionResult::ViewModel(serde_json::Value::Null))
    }
}

impl IntoActionResult for serde_json::Value {
    fn into_action_result(self) -> Result<ActionResult> {
        Ok(ActionResult::ViewModel(self))
    }
}

impl<T: Serialize> IntoActionResult for View<T> {
    fn into_action_result(self) -> Result<ActionResult> {
        serde_json::to_value(&self.0)
            .map(ActionResult::ViewModel)
            .map_err(|e| MvcError::action(format!("view model is not serializable: {e}")))
    }
}

impl<T, E> IntoActionResult for std::result::Result<T, E>
where
    T: IntoActionResult,
    E: fmt::Display + 'static,
{
    fn into_action_result(self) -> Result<ActionResult> {
        self.map_err(action_error)?.into_action_result()
    }
}

/// `MvcError`s pass through unchanged, anything else becomes [`MvcError::Action`].
fn action_error<E: fmt::Display + 'static>(error: E) -> MvcError {
    let mut slot = Some(error);
    if let Some(error) = (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<MvcError>>()
        .and_then(Option::take)
    {
        return error;
    }
    MvcError::action(slot.map(|e| e.to_string()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Action;
    use crate::di::{Container, Injectable};
    use serde_json::json;

    struct Account;

    impl Injectable for Account {
        fn inject(_: &Container) -> Result<Self> {
            Ok(Account)
        }
    }

    impl Controller for Account {
        const NAME: &'static str = "Account";
        const MODULE_PATH: &'static str = "app::controllers";

        fn actions() -> Vec<Action<Self>> {
            Vec::new()
        }
    }

    #[derive(Serialize)]
    struct Profile {
        name: &'static str,
    }

    #[test]
    fn test_to_action_strips_verb_prefix() {
        let none: [u32; 0] = [];
        assert_eq!(Redirect::to_action::<Account>("GetIndex", &none).target(), "/Account/Index");
        assert_eq!(Redirect::to_action::<Account>("PostLogin", &none).target(), "/Account/Login");
        assert_eq!(Redirect::to_action::<Account>("Settings", &none).target(), "/Account/Settings");
    }

    #[test]
    fn test_to_action_appends_params() {
        let redirect = Redirect::to_action::<Account>("GetEdit", &["42", "avatar"]);
        assert_eq!(redirect.to_string(), "/Account/Edit/42/avatar");
    }

    #[test]
    fn test_to_action_encodes_params() {
        let redirect = Redirect::to_action::<Account>("GetEdit", &["a b", "café", "x/y"]);
        assert_eq!(redirect.target(), "/Account/Edit/a%20b/caf%C3%A9/x%2Fy");
        assert!(redirect.target().is_ascii());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(
            ().into_action_result().unwrap(),
            ActionResult::ViewModel(serde_json::Value::Null)
        );
        assert_eq!(
            vec![1u8, 2].into_action_result().unwrap(),
            ActionResult::RawBytes(Bytes::from_static(&[1, 2]))
        );
        assert_eq!(
            View(Profile { name: "ada" }).into_action_result().unwrap(),
            ActionResult::ViewModel(json!({ "name": "ada" }))
        );
    }

    #[test]
    fn test_mvc_errors_are_kept() {
        let result: Result<Redirect> = Err(MvcError::Internal("db down".into()));
        assert!(matches!(
            result.into_action_result(),
            Err(MvcError::Internal(msg)) if msg == "db down"
        ));
    }

    #[test]
    fn test_error_result_becomes_action_error() {
        let result: std::result::Result<Redirect, String> = Err("no such user".into());
        match result.into_action_result() {
            Err(MvcError::Action { message, .. }) => assert_eq!(message, "no such user"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
