use crate::error::{MvcError, Result};
use dashmap::DashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Key/value configuration source, seeded from the process environment.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Snapshot of the current environment variables.
    pub fn from_env() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| MvcError::Config {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

pub const VIEWS_ROOT_KEY: &str = "SIMPLEMVC_VIEWS_ROOT";
pub const VIEW_EXTENSION_KEY: &str = "SIMPLEMVC_VIEW_EXTENSION";
pub const DEFAULT_CONTROLLER_KEY: &str = "SIMPLEMVC_DEFAULT_CONTROLLER";
pub const DEFAULT_ACTION_KEY: &str = "SIMPLEMVC_DEFAULT_ACTION";
pub const AUTH_SCHEME_KEY: &str = "SIMPLEMVC_AUTH_SCHEME";
pub const CONTROLLER_NAMESPACE_KEY: &str = "SIMPLEMVC_CONTROLLER_NAMESPACE";
pub const WORKER_THREADS_KEY: &str = "SIMPLEMVC_WORKER_THREADS";
pub const MAX_FORM_BYTES_KEY: &str = "SIMPLEMVC_MAX_FORM_BYTES";

/// Conventions and limits used by the MVC middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MvcOptions {
    /// Directory holding `<Controller>/<Action>.<ext>` templates.
    pub views_root: PathBuf,
    /// Template file extension, without the dot.
    pub view_extension: String,
    /// Controller used for requests to `/`.
    pub default_controller: String,
    /// Action suffix used when no action segment matches (`Get` + `Index`).
    pub default_action: String,
    /// Scheme name handed to the authenticator.
    pub auth_scheme: String,
    /// Last module path segment a controller must live in.
    pub controller_namespace: String,
    /// Worker pool size; `None` means one thread per logical CPU.
    pub worker_threads: Option<usize>,
    /// Upper bound for buffered form bodies.
    pub max_form_bytes: usize,
}

impl Default for MvcOptions {
    fn default() -> Self {
        Self {
            views_root: PathBuf::from("Views"),
            view_extension: "html".to_string(),
            default_controller: "Home".to_string(),
            default_action: "Index".to_string(),
            auth_scheme: "Cookie".to_string(),
            controller_namespace: "controllers".to_string(),
            worker_threads: None,
            max_form_bytes: 2 * 1024 * 1024,
        }
    }
}

impl MvcOptions {
    /// Defaults overridden by any `SIMPLEMVC_*` keys present in `config`.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let mut options = Self::default();

        if let Some(root) = config.get(VIEWS_ROOT_KEY) {
            options.views_root = PathBuf::from(root);
        }
        if let Some(ext) = config.get(VIEW_EXTENSION_KEY) {
            options.view_extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(controller) = non_empty(config, DEFAULT_CONTROLLER_KEY)? {
            options.default_controller = controller;
        }
        if let Some(action) = non_empty(config, DEFAULT_ACTION_KEY)? {
            options.default_action = action;
        }
        if let Some(scheme) = non_empty(config, AUTH_SCHEME_KEY)? {
            options.auth_scheme = scheme;
        }
        if let Some(namespace) = non_empty(config, CONTROLLER_NAMESPACE_KEY)? {
            options.controller_namespace = namespace;
        }
        if let Some(threads) = config.parse::<usize>(WORKER_THREADS_KEY)? {
            if threads == 0 {
                return Err(MvcError::Config {
                    key: WORKER_THREADS_KEY.to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            options.worker_threads = Some(threads);
        }
        if let Some(limit) = config.parse::<usize>(MAX_FORM_BYTES_KEY)? {
            options.max_form_bytes = limit;
        }

        Ok(options)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&ConfigService::from_env())
    }
}

fn non_empty(config: &ConfigService, key: &str) -> Result<Option<String>> {
    match config.get(key) {
        Some(value) if value.trim().is_empty() => Err(MvcError::Config {
            key: key.to_string(),
            message: "must not be empty".to_string(),
        }),
        other => Ok(other.map(|v| v.trim().to_string())),
    }
}
