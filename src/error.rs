use thiserror::Error;

pub type Result<T> = std::result::Result<T, MvcError>;

#[derive(Debug, Error)]
pub enum MvcError {
    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Controller '{name}' is registered more than once")]
    DuplicateController { name: String },

    #[error("Controller '{controller}' declares action '{action}' more than once")]
    DuplicateAction { controller: String, action: String },

    #[error("View not found: {path}")]
    ViewNotFound { path: String },

    #[error("Failed to read view {path}: {source}")]
    ViewRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template rendering failed: {0}")]
    Render(String),

    #[error("Invalid form body: {0}")]
    Form(String),

    #[error("Action {controller}.{action} failed: {message}")]
    Action {
        controller: String,
        action: String,
        message: String,
    },

    #[error("Action panicked: {0}")]
    ActionPanicked(String),

    #[error("Invalid configuration for {key}: {message}")]
    Config { key: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MvcError {
    pub(crate) fn action(message: impl std::fmt::Display) -> Self {
        MvcError::Action {
            controller: String::new(),
            action: String::new(),
            message: message.to_string(),
        }
    }

    /// Attach the controller/action pair to an action failure raised without one.
    pub(crate) fn in_action(self, controller: &str, action: &str) -> Self {
        match self {
            MvcError::Action { message, .. } => MvcError::Action {
                controller: controller.to_string(),
                action: action.to_string(),
                message,
            },
            other => other,
        }
    }
}

impl axum::response::IntoResponse for MvcError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            MvcError::Form(_) => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_in_action_fills_names() {
        let err = MvcError::action("boom").in_action("Home", "GetIndex");
        assert_eq!(err.to_string(), "Action Home.GetIndex failed: boom");
    }

    #[test]
    fn test_view_not_found_is_server_error() {
        let response = MvcError::ViewNotFound {
            path: "Views/Home/GetIndex.html".into(),
        }
        .into_response();
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_form_error_is_bad_request() {
        let response = MvcError::Form("truncated".into()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
