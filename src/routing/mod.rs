//! Convention routing: `/<Controller>/<action>/<p1>/<p2>...` with the HTTP verb
//! prefixed to the action name.

mod form;

pub use form::{FormBody, is_form_request, read_form};

use crate::config::MvcOptions;
use crate::controller::ControllerRegistry;
use crate::params::normalize_key;
use axum::http::{Method, request::Parts};
use std::collections::HashMap;

/// Controller, action and parameters resolved for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MvcQuery {
    controller: Option<String>,
    action: Option<String>,
    parameters: HashMap<String, String>,
}

impl MvcQuery {
    /// Resolve a request against the registry.
    ///
    /// `form` holds the decoded form fields, empty for requests without a form body.
    /// Path segments are percent-decoded and parameter keys are normalized with
    /// [`normalize_key`], so `Param1` from the path always replaces a form field
    /// spelled `param1` or `param_1`.
    pub fn parse(
        request: &Parts,
        form: &[(String, String)],
        registry: &ControllerRegistry,
        options: &MvcOptions,
    ) -> Self {
        let verb = normalize_verb(&request.method);
        let mut segments = request
            .uri
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment);

        let Some(controller_name) = segments.next() else {
            return Self {
                controller: Some(options.default_controller.clone()),
                action: Some(format!("{verb}{}", options.default_action)),
                parameters: HashMap::new(),
            };
        };

        let Some(controller) = registry.get(&controller_name) else {
            return Self::no_match();
        };

        let mut parameters: HashMap<String, String> = HashMap::new();
        for (key, value) in form {
            // first value wins for repeated fields
            parameters
                .entry(normalize_key(key))
                .or_insert_with(|| value.clone());
        }

        let mut positional = Vec::new();
        let mut action = format!("{verb}{}", options.default_action);
        if let Some(candidate) = segments.next() {
            let name = format!("{verb}{}", capitalize(&candidate));
            if controller.has_action(&name) {
                action = name;
            } else {
                positional.push(candidate);
            }
        }
        positional.extend(segments);

        for (index, value) in positional.into_iter().enumerate() {
            let key = format!("Param{}", index + 1);
            if let Some(shadowed) = parameters.insert(key.clone(), value) {
                tracing::debug!(%key, %shadowed, "path segment replaces form field");
            }
        }

        Self {
            controller: Some(controller.name().to_string()),
            action: Some(action),
            parameters,
        }
    }

    /// A query that tells the middleware to hand the request on.
    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// `GET`, `get` and `Get` all become `Get`; unknown verbs get the same casing.
pub fn normalize_verb(method: &Method) -> String {
    capitalize(&method.as_str().to_ascii_lowercase())
}

/// `Ada%20Lovelace` → `Ada Lovelace`; segments that do not decode to UTF-8 stay as sent.
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Action, Controller};
    use crate::di::{Container, Injectable};
    use crate::error::Result;
    use axum::http::Request;

    struct Blog;

    impl Injectable for Blog {
        fn inject(_: &Container) -> Result<Self> {
            Ok(Blog)
        }
    }

    impl Controller for Blog {
        const NAME: &'static str = "Blog";
        const MODULE_PATH: &'static str = "site::controllers";

        fn actions() -> Vec<Action<Self>> {
            vec![
                Action::new("GetIndex", |_: &Blog| ()),
                Action::new("GetArchive", |_: &Blog| ()),
                Action::new("PostComment", |_: &Blog| ()),
            ]
        }
    }

    fn registry() -> ControllerRegistry {
        ControllerRegistry::builder()
            .controller::<Blog>()
            .build()
            .unwrap()
    }

    fn parse_with(method: &str, path: &str, form: &[(&str, &str)]) -> MvcQuery {
        let (parts, _) = Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
            .into_parts();
        let form: Vec<(String, String)> = form
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MvcQuery::parse(&parts, &form, &registry(), &MvcOptions::default())
    }

    fn parse(method: &str, path: &str) -> MvcQuery {
        parse_with(method, path, &[])
    }

    #[test]
    fn test_root_uses_defaults() {
        for path in ["/", "//", "///"] {
            let query = parse("GET", path);
            assert_eq!(query.controller(), Some("Home"));
            assert_eq!(query.action(), Some("GetIndex"));
            assert!(query.parameters().is_empty());
        }
        assert_eq!(parse("POST", "/").action(), Some("PostIndex"));
    }

    #[test]
    fn test_controller_only() {
        let query = parse("GET", "/Blog");
        assert_eq!(query.controller(), Some("Blog"));
        assert_eq!(query.action(), Some("GetIndex"));
        assert!(query.parameters().is_empty());
        assert_eq!(parse("GET", "//Blog/").action(), Some("GetIndex"));
    }

    #[test]
    fn test_action_segment_matches() {
        let query = parse("GET", "/Blog/archive");
        assert_eq!(query.action(), Some("GetArchive"));
        assert_eq!(query.parameter("Param1"), None);

        let query = parse("GET", "/Blog/Archive/2024");
        assert_eq!(query.action(), Some("GetArchive"));
        assert_eq!(query.parameter("Param1"), Some("2024"));
        assert_eq!(query.parameters().len(), 1);
    }

    #[test]
    fn test_unmatched_segment_becomes_parameter() {
        let query = parse("GET", "/Blog/hello-world");
        assert_eq!(query.action(), Some("GetIndex"));
        assert_eq!(query.parameter("Param1"), Some("hello-world"));

        let query = parse("GET", "/Blog/hello/world");
        assert_eq!(query.parameter("Param1"), Some("hello"));
        assert_eq!(query.parameter("Param2"), Some("world"));
    }

    #[test]
    fn test_verb_selects_action() {
        // GetComment does not exist, PostComment does
        let get = parse("GET", "/Blog/comment");
        assert_eq!(get.action(), Some("GetIndex"));
        assert_eq!(get.parameter("Param1"), Some("comment"));

        let post = parse("post", "/Blog/comment");
        assert_eq!(post.action(), Some("PostComment"));
        assert!(post.parameters().is_empty());
    }

    #[test]
    fn test_unknown_controller_is_no_match() {
        let query = parse_with("POST", "/Shop/cart/1", &[("qty", "2")]);
        assert!(!query.is_match());
        assert_eq!(query.action(), None);
        assert!(query.parameters().is_empty());
    }

    #[test]
    fn test_form_fields_come_first() {
        let query = parse_with(
            "POST",
            "/Blog/comment/42",
            &[("author", "ada"), ("body", "hi"), ("author", "bob")],
        );
        assert_eq!(query.action(), Some("PostComment"));
        assert_eq!(query.parameter("Author"), Some("ada"));
        assert_eq!(query.parameter("Body"), Some("hi"));
        assert_eq!(query.parameter("Param1"), Some("42"));
        assert_eq!(query.parameters().len(), 3);
    }

    #[test]
    fn test_path_segment_wins_over_form_field_of_same_key() {
        let query = parse_with("POST", "/Blog/x", &[("Param1", "form")]);
        assert_eq!(query.parameter("Param1"), Some("x"));
    }

    #[test]
    fn test_form_keys_are_normalized_before_positional_params() {
        for _ in 0..20 {
            let query = parse_with(
                "POST",
                "/Blog/x",
                &[("param1", "form"), ("param_1", "other"), ("first_name", "Ada")],
            );
            assert_eq!(query.parameter("Param1"), Some("x"));
            assert_eq!(query.parameter("FirstName"), Some("Ada"));
            assert_eq!(query.parameters().len(), 2);
        }
    }

    #[test]
    fn test_differently_spelled_form_keys_keep_first_value() {
        let query = parse_with(
            "POST",
            "/Blog/comment",
            &[("first_name", "Ada"), ("FirstName", "Bob"), ("first-name", "Cy")],
        );
        assert_eq!(query.parameter("FirstName"), Some("Ada"));
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        let query = parse("GET", "/Blog/Ada%20Lovelace/caf%C3%A9");
        assert_eq!(query.action(), Some("GetIndex"));
        assert_eq!(query.parameter("Param1"), Some("Ada Lovelace"));
        assert_eq!(query.parameter("Param2"), Some("café"));

        assert_eq!(parse("GET", "/Bl%6Fg/%61rchive").action(), Some("GetArchive"));
        // invalid UTF-8 stays as sent
        assert_eq!(parse("GET", "/Blog/%FF").parameter("Param1"), Some("%FF"));
    }

    #[test]
    fn test_redirect_targets_parse_back() {
        use crate::result::Redirect;

        let redirect = Redirect::to_action::<Blog>("GetArchive", &["a b/c", "café", "50%"]);
        let query = parse("GET", redirect.target());
        assert_eq!(query.action(), Some("GetArchive"));
        assert_eq!(query.parameter("Param1"), Some("a b/c"));
        assert_eq!(query.parameter("Param2"), Some("café"));
        assert_eq!(query.parameter("Param3"), Some("50%"));
    }

    #[test]
    fn test_normalize_verb() {
        assert_eq!(normalize_verb(&Method::GET), "Get");
        assert_eq!(normalize_verb(&Method::DELETE), "Delete");
        assert_eq!(normalize_verb(&Method::from_bytes(b"PURGE").unwrap()), "Purge");
        assert_eq!(normalize_verb(&Method::from_bytes(b"get").unwrap()), "Get");
    }
}
