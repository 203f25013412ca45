mod substitution;

pub use substitution::SubstitutionRenderer;

use crate::config::MvcOptions;
use crate::error::{MvcError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Turns template source plus a view model into response text.
///
/// Called on the worker pool, so implementations may block.
pub trait TemplateRenderer: Send + Sync + 'static {
    fn render(&self, template: &str, model: &serde_json::Value) -> Result<String>;
}

/// `<views_root>/<controller>/<action>.<ext>`
pub fn view_path(options: &MvcOptions, controller: &str, action: &str) -> PathBuf {
    options
        .views_root
        .join(controller)
        .join(format!("{action}.{}", options.view_extension))
}

/// Blocking read of a view template. A missing file is [`MvcError::ViewNotFound`].
pub fn load_view(options: &MvcOptions, controller: &str, action: &str) -> Result<String> {
    let path = view_path(options, controller, action);
    std::fs::read_to_string(&path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => MvcError::ViewNotFound {
            path: path.display().to_string(),
        },
        _ => MvcError::ViewRead {
            path: path.display().to_string(),
            source,
        },
    })
}
