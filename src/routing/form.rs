use crate::error::{MvcError, Result};
use axum::body::Body;
use axum::http::{HeaderMap, header};
use bytes::Bytes;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A buffered `application/x-www-form-urlencoded` body.
#[derive(Debug, Clone, Default)]
pub struct FormBody {
    /// Original bytes, re-attached when the request is passed on.
    pub raw: Bytes,
    /// Decoded fields in body order.
    pub fields: Vec<(String, String)>,
}

/// Whether the content type is a url-encoded form, ignoring parameters such as `charset`.
pub fn is_form_request(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Buffer at most `limit` bytes of `body` and decode its fields.
pub async fn read_form(body: Body, limit: usize) -> Result<FormBody> {
    let raw = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| MvcError::Form(format!("failed to read body: {e}")))?;
    let fields = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&raw)
        .map_err(|e| MvcError::Form(e.to_string()))?;
    Ok(FormBody { raw, fields })
}
