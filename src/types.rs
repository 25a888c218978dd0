//! Core value and result types shared across the query pipeline

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Prefix for every cache key produced by the compiler
pub const CACHE_KEY_PREFIX: &str = "ikb_query_";

/// Runtime origin of a `{SOURCE:key}` placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderSource {
    Get,
    Post,
    Env,
    Session,
    Cookie,
}

impl PlaceholderSource {
    /// Parse a source word as it appears in directive text. Case-sensitive:
    /// only the uppercase forms are recognized.
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "ENV" => Some(Self::Env),
            "SESSION" => Some(Self::Session),
            "COOKIE" => Some(Self::Cookie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Env => "ENV",
            Self::Session => "SESSION",
            Self::Cookie => "COOKIE",
        }
    }
}

impl fmt::Display for PlaceholderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An unresolved `{SOURCE:key}` reference. Produced by the parser,
/// replaced by the resolver; must not survive past compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub source: PlaceholderSource,
    pub key: String,
}

/// Tagged attribute value. Placeholders only exist between parsing and
/// resolution; everything downstream sees concrete scalars or arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Boolean(bool),
    Array(Vec<Value>),
    Placeholder(Placeholder),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            Value::Boolean(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Truthiness used by the executor's `cache` attribute check
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::String(s) => crate::utils::is_truthy_token(s),
            Value::Array(items) => !items.is_empty(),
            Value::Placeholder(_) => false,
        }
    }

    /// Convert a parsed JSON value into an attribute value. Floats are
    /// truncated to integers; objects flatten to their values in key order.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Integer(n.as_i64().unwrap_or_else(|| {
                n.as_f64().map(|f| f as i64).unwrap_or(0)
            })),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Array(map.values().map(Value::from_json).collect())
            }
        }
    }

    /// JSON view of a value. Placeholders have no JSON form; any that
    /// reach this point serialize as null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Placeholder(_) => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Array(_) => write!(f, "{}", self.to_json()),
            Value::Placeholder(p) => write!(f, "{{{}:{}}}", p.source, p.key),
        }
    }
}

/// Per-request runtime values, one sub-map per placeholder source.
/// BTreeMaps keep serialization order deterministic so the cache key is a
/// pure function of the context contents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeContext {
    pub get: BTreeMap<String, String>,
    pub post: BTreeMap<String, String>,
    pub env: BTreeMap<String, String>,
    pub session: BTreeMap<String, String>,
    pub cookie: BTreeMap<String, String>,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, source: PlaceholderSource, key: &str) -> Option<&str> {
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

/// Output of the compilation pipeline: the validated, defaulted, typed
/// attribute map plus accumulated errors and cache metadata.
///
/// A non-empty `errors` list does not block execution; validation and
/// execution are intentionally decoupled. Callers wanting strict behavior
/// inspect `errors` before calling the executor.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub attributes: HashMap<String, Value>,
    pub errors: Vec<String>,
    pub cache_key: String,
    pub compiled_at_ms: f64,
}

impl CompiledQuery {
    /// Integer attribute lookup with a fallback for absent/mistyped values
    pub fn int_attr(&self, name: &str, fallback: i64) -> i64 {
        self.attributes
            .get(name)
            .and_then(Value::as_i64)
            .unwrap_or(fallback)
    }

    pub fn str_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// A single entry in the cache store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: String,
    pub expires_at: Option<u64>,
    pub hit_count: u64,
    pub last_hit_at: Option<u64>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Canonical, renderer-facing item shape. Heterogeneous source records
/// are mapped into this by the bridge's normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Outcome of one execution cycle. Failure is data, never a panic or an
/// error that crosses the executor boundary.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub items: Vec<NormalizedItem>,
    pub cached: bool,
    pub elapsed_ms: f64,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn failure(error: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            success: false,
            items: Vec::new(),
            cached: false,
            elapsed_ms,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_source_parsing() {
        assert_eq!(PlaceholderSource::parse("GET"), Some(PlaceholderSource::Get));
        assert_eq!(PlaceholderSource::parse("COOKIE"), Some(PlaceholderSource::Cookie));
        assert_eq!(PlaceholderSource::parse("get"), None);
        assert_eq!(PlaceholderSource::parse("HEADER"), None);
    }

    #[test]
    fn test_value_truthiness() {
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Integer(5).is_truthy());
        assert!(Value::String("yes".to_string()).is_truthy());
        assert!(!Value::String("false".to_string()).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Integer(0).is_truthy());
    }

    #[test]
    fn test_value_json_round_trip() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"ids": [1, 2, 3], "draft": false}"#).unwrap();
        let value = Value::from_json(&json);
        match value {
            Value::Array(ref items) => assert_eq!(items.len(), 2),
            _ => panic!("Expected array value from object"),
        }
    }

    #[test]
    fn test_cache_entry_expiry() {
        let entry = CacheEntry {
            key: "k".to_string(),
            payload: "[]".to_string(),
            expires_at: Some(100),
            hit_count: 0,
            last_hit_at: None,
        };
        assert!(!entry.is_expired(99));
        assert!(entry.is_expired(100));
        assert!(entry.is_expired(101));

        let forever = CacheEntry {
            expires_at: None,
            ..entry
        };
        assert!(!forever.is_expired(u64::MAX));
    }
}
