use super::TemplateRenderer;
use crate::error::{MvcError, Result};
use serde_json::Value;

/// Minimal renderer replacing `{{ path }}` with values from the view model.
///
/// Paths are dot separated (`user.name`, `items.0`); `{{ . }}` is the whole model.
/// Missing values render as nothing. Output is HTML-escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionRenderer;

impl TemplateRenderer for SubstitutionRenderer {
    fn render(&self, template: &str, model: &Value) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| {
                MvcError::Render(format!(
                    "unclosed '{{{{' at byte {}",
                    template.len() - rest.len() + start
                ))
            })?;
            if let Some(value) = lookup(model, after[..end].trim()) {
                escape_into(&mut out, &display(value));
            }
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

fn lookup<'a>(model: &'a Value, path: &str) -> Option<&'a Value> {
    if path == "." {
        return Some(model);
    }
    path.split('.').try_fold(model, |value, key| match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
