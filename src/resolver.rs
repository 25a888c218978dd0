//! Placeholder resolution against runtime and ambient context

use crate::types::{PlaceholderSource, RuntimeContext, Value};
use crate::utils::escape_html;
use std::collections::BTreeMap;

/// Process-ambient fallback values, consulted when the explicit
/// `RuntimeContext` omits a source. An injected capability object rather
/// than hidden global reads, so tests can supply their own.
#[derive(Debug, Clone, Default)]
pub struct AmbientContext {
    pub get: BTreeMap<String, String>,
    pub post: BTreeMap<String, String>,
    pub env: BTreeMap<String, String>,
    pub session: BTreeMap<String, String>,
    pub cookie: BTreeMap<String, String>,
}

impl AmbientContext {
    /// Empty ambient context; placeholders resolve only from the
    /// explicit per-request context.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ambient context seeded from the process environment. GET/POST/
    /// SESSION/COOKIE have no process-level analogue and start empty;
    /// the host fills them per request.
    pub fn from_process() -> Self {
        Self {
            env: std::env::vars().collect(),
            ..Self::default()
        }
    }

    fn lookup(&self, source: PlaceholderSource, key: &str) -> Option<&str> {
        let map = match source {
            PlaceholderSource::Get => &self.get,
            PlaceholderSource::Post => &self.post,
            PlaceholderSource::Env => &self.env,
            PlaceholderSource::Session => &self.session,
            PlaceholderSource::Cookie => &self.cookie,
        };
        map.get(key).map(String::as_str)
    }
}

/// Replace every placeholder in the value tree with its runtime value.
/// Lookup order: explicit context, then ambient fallback, else null.
/// Resolved strings are HTML-escaped; non-placeholder scalars pass
/// through untouched and arrays are walked element-wise.
pub fn resolve_value(value: Value, context: &RuntimeContext, ambient: &AmbientContext) -> Value {
    match value {
        Value::Placeholder(placeholder) => {
            let resolved = context
                .lookup(placeholder.source, &placeholder.key)
                .or_else(|| ambient.lookup(placeholder.source, &placeholder.key));
            match resolved {
                Some(text) => Value::String(escape_html(text)),
                None => Value::Null,
            }
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| resolve_value(item, context, ambient))
                .collect(),
        ),
        other => other,
    }
}
