use crate::auth::Identity;
use crate::error::{MvcError, Result};
use axum::http::{HeaderMap, Method, Uri, request::Parts};
use heck::ToUpperCamelCase;
use std::collections::HashMap;
use std::str::FromStr;

/// Request data handed to an action alongside its parameters.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    controller: String,
    action: String,
    identity: Option<Identity>,
}

impl RequestContext {
    pub fn new(parts: &Parts, controller: &str, action: &str, identity: Option<Identity>) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            controller: controller.to_string(),
            action: action.to_string(),
            identity,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Set when the action or its controller requires authentication.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Turn `first_name`, `first-name` or `first name` into `FirstName`.
pub fn normalize_key(key: &str) -> String {
    key.to_upper_camel_case().replace(' ', "")
}

/// Parameter bag passed to one-argument actions.
///
/// Keys are normalized with [`normalize_key`], so form fields and the positional
/// `Param1`, `Param2`, … segments are looked up the same way.
#[derive(Debug, Clone)]
pub struct Params {
    values: HashMap<String, String>,
    context: RequestContext,
}

impl Params {
    pub fn new<I, K, V>(values: I, context: RequestContext) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut normalized: HashMap<String, String> = HashMap::new();
        for (key, value) in values {
            // keys that normalize alike keep the first value
            normalized
                .entry(normalize_key(key.as_ref()))
                .or_insert_with(|| value.into());
        }
        Self {
            values: normalized,
            context,
        }
    }

    /// Lookup by normalized name; `get("first_name")` and `get("FirstName")` agree.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .or_else(|| self.values.get(&normalize_key(key)))
            .map(String::as_str)
    }

    /// Like [`get`](Self::get) but missing keys are an action error.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| MvcError::action(format!("missing parameter '{key}'")))
    }

    /// Parse a present value; `Ok(None)` when the key is absent.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| MvcError::action(format!("parameter '{key}': {e}")))
            })
            .transpose()
    }

    /// The `n`-th positional path segment, starting at 1.
    pub fn positional(&self, n: usize) -> Option<&str> {
        self.get(&format!("Param{n}"))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn context() -> RequestContext {
        let (parts, _) = Request::post("/Account/Save").body(()).unwrap().into_parts();
        RequestContext::new(&parts, "Account", "PostSave", None)
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("first_name"), "FirstName");
        assert_eq!(normalize_key("first-name"), "FirstName");
        assert_eq!(normalize_key("first name"), "FirstName");
        assert_eq!(normalize_key("Param1"), "Param1");
        assert_eq!(normalize_key("email"), "Email");
    }

    #[test]
    fn test_lookup_is_key_style_agnostic() {
        let params = Params::new([("first_name", "Ada"), ("Param1", "7")], context());
        assert_eq!(params.get("FirstName"), Some("Ada"));
        assert_eq!(params.get("first-name"), Some("Ada"));
        assert_eq!(params.positional(1), Some("7"));
        assert_eq!(params.positional(2), None);
    }

    #[test]
    fn test_colliding_keys_keep_first_value() {
        for _ in 0..20 {
            let params = Params::new(
                [("Param1", "path"), ("param1", "form"), ("param_1", "other")],
                context(),
            );
            assert_eq!(params.len(), 1);
            assert_eq!(params.positional(1), Some("path"));
        }
    }

    #[test]
    fn test_parse_and_require() {
        let params = Params::new([("age", "36"), ("name", "x")], context());
        assert_eq!(params.parse::<u32>("age").unwrap(), Some(36));
        assert_eq!(params.parse::<u32>("missing").unwrap(), None);
        assert!(params.parse::<u32>("name").is_err());
        assert!(params.require("missing").is_err());
    }

    #[test]
    fn test_context_accessors() {
        let params = Params::new(Vec::<(String, String)>::new(), context());
        assert!(params.is_empty());
        assert_eq!(params.context().method(), Method::POST);
        assert_eq!(params.context().uri().path(), "/Account/Save");
        assert_eq!(params.context().action(), "PostSave");
        assert!(params.context().identity().is_none());
    }
}
