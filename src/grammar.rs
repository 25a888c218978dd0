//! Static grammar registry: the closed vocabulary of directive parameters

use crate::types::Value;
use crate::utils::{is_boolean_token, is_falsy_token, is_truthy_token};
use serde::Serialize;
use std::collections::HashMap;

/// Declared type of a directive parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Boolean,
}

/// Validation and defaulting rules for one recognized parameter name
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    pub name: &'static str,
    pub required: bool,
    pub param_type: ParamType,
    pub default: Option<Value>,
    pub enum_values: Option<&'static [&'static str]>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub description: &'static str,
}

impl ParameterDefinition {
    fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: false,
            param_type: ParamType::String,
            default: None,
            enum_values: None,
            min: None,
            max: None,
            description,
        }
    }

    fn integer(name: &'static str, description: &'static str) -> Self {
        Self {
            param_type: ParamType::Integer,
            ..Self::string(name, description)
        }
    }

    fn boolean(name: &'static str, description: &'static str) -> Self {
        Self {
            param_type: ParamType::Boolean,
            ..Self::string(name, description)
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn default_str(mut self, value: &str) -> Self {
        self.default = Some(Value::String(value.to_string()));
        self
    }

    fn default_int(mut self, value: i64) -> Self {
        self.default = Some(Value::Integer(value));
        self
    }

    fn default_bool(mut self, value: bool) -> Self {
        self.default = Some(Value::Boolean(value));
        self
    }

    fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.enum_values = Some(values);
        self
    }

    fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Serializable introspection view of one parameter, for authoring tools
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub default: Option<serde_json::Value>,
    pub enum_values: Option<Vec<&'static str>>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub description: &'static str,
}

/// Full grammar export: parameter table plus the lexical shape of the
/// directive syntax, consumed by syntax highlighters and validation UIs.
#[derive(Debug, Clone, Serialize)]
pub struct GrammarSpec {
    pub syntax: &'static str,
    pub placeholder_sources: Vec<&'static str>,
    pub truthy_tokens: Vec<&'static str>,
    pub falsy_tokens: Vec<&'static str>,
    pub parameters: Vec<ParameterSpec>,
}

const SYNTAX_SHAPE: &str =
    "query := attribute ((','|WS) attribute)* ; attribute := identifier '=' value ; \
     value := number | boolean | bareword | quotedString | '{' jsonBody '}' | \
     '{' source ':' identifier '}'";

/// The process-wide table of recognized parameter names. Unknown names are
/// rejected by `validate` (closed vocabulary) but never dropped from the
/// attribute map; that decision sits with the compiler's caller.
pub struct Grammar {
    definitions: HashMap<&'static str, ParameterDefinition>,
}

impl Grammar {
    pub fn new() -> Self {
        let defs = vec![
            // Query shape
            ParameterDefinition::string("type", "Content type to query")
                .required()
                .default_str("post"),
            ParameterDefinition::integer("limit", "Maximum number of items")
                .default_int(10)
                .range(1, 100),
            ParameterDefinition::integer("offset", "Number of items to skip")
                .default_int(0)
                .range(0, 10_000),
            ParameterDefinition::string("order", "Sort direction")
                .default_str("desc")
                .one_of(&["asc", "desc"]),
            ParameterDefinition::string("orderby", "Sort field")
                .default_str("date")
                .one_of(&["date", "title", "modified", "rand", "author", "id", "menu_order"]),
            ParameterDefinition::string("status", "Publication status filter")
                .default_str("publish")
                .one_of(&["publish", "draft", "pending", "future", "private", "any"]),
            // Filtering
            ParameterDefinition::string("category", "Category slug filter"),
            ParameterDefinition::string("tag", "Tag slug filter"),
            ParameterDefinition::string("author", "Author login or id filter"),
            ParameterDefinition::string("search", "Full-text search term"),
            ParameterDefinition::string("meta_key", "Metadata key filter"),
            ParameterDefinition::string("meta_value", "Metadata value filter"),
            ParameterDefinition::string("include", "Comma-separated ids to include"),
            ParameterDefinition::string("exclude", "Comma-separated ids to exclude"),
            ParameterDefinition::string("date_from", "Earliest publication date"),
            ParameterDefinition::string("date_to", "Latest publication date"),
            // Presentation
            ParameterDefinition::string("format", "Per-item presentation style")
                .default_str("card")
                .one_of(&["card", "list", "grid", "hero", "minimal", "full", "table", "carousel"]),
            ParameterDefinition::string("layout", "Structural container around items")
                .default_str("vertical")
                .one_of(&["vertical", "horizontal", "grid-2", "grid-3", "grid-4", "masonry", "slider"]),
            ParameterDefinition::integer("columns", "Column count for grid layouts")
                .default_int(3)
                .range(1, 6),
            ParameterDefinition::string("gap", "Spacing between layout cells")
                .default_str("medium")
                .one_of(&["none", "small", "medium", "large"]),
            ParameterDefinition::string("thumbnail_size", "Thumbnail variant to request")
                .default_str("medium")
                .one_of(&["thumbnail", "medium", "large", "full"]),
            ParameterDefinition::integer("excerpt_length", "Excerpt length in words")
                .default_int(55)
                .range(0, 500),
            ParameterDefinition::string("link_target", "Anchor target for item links")
                .default_str("_self")
                .one_of(&["_self", "_blank"]),
            ParameterDefinition::string("class", "Extra CSS class on the container"),
            // Caching
            ParameterDefinition::boolean("cache", "Whether results may be cached")
                .default_bool(true),
            ParameterDefinition::integer("cache_ttl", "Cache lifetime in seconds")
                .default_int(3600)
                .range(0, 86_400),
            // Source selection
            ParameterDefinition::string("cms", "Named content source to query"),
        ];

        let mut definitions = HashMap::with_capacity(defs.len());
        for def in defs {
            definitions.insert(def.name, def);
        }
        Self { definitions }
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.definitions.get(name)
    }

    pub fn all(&self) -> &HashMap<&'static str, ParameterDefinition> {
        &self.definitions
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.get(name).map(|d| d.required).unwrap_or(false)
    }

    pub fn default_for(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(|d| d.default.clone())
    }

    /// Check a value against a parameter's rules. Unknown names fail.
    /// This never mutates the value; coercion is `normalize`'s job, and
    /// the two are deliberately not composed.
    pub fn validate(&self, name: &str, value: &Value) -> bool {
        let def = match self.get(name) {
            Some(def) => def,
            None => return false,
        };

        match def.param_type {
            ParamType::Integer => {
                let n = match value.as_i64() {
                    Some(n) => n,
                    None => return false,
                };
                if matches!(def.min, Some(min) if n < min) {
                    return false;
                }
                if matches!(def.max, Some(max) if n > max) {
                    return false;
                }
                true
            }
            ParamType::Boolean => match value {
                Value::Boolean(_) => true,
                Value::Integer(i) => *i == 0 || *i == 1,
                Value::String(s) => is_boolean_token(s),
                _ => false,
            },
            ParamType::String => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Integer(i) => i.to_string(),
                    Value::Boolean(b) => b.to_string(),
                    _ => return false,
                };
                match def.enum_values {
                    Some(allowed) => allowed.contains(&text.as_str()),
                    None => true,
                }
            }
        }
    }

    /// Lossless type coercion toward the declared parameter type. Values
    /// that cannot be coerced pass through unchanged; out-of-range values
    /// are NOT clamped. Unknown names pass through untouched.
    pub fn normalize(&self, name: &str, value: Value) -> Value {
        let def = match self.get(name) {
            Some(def) => def,
            None => return value,
        };

        match def.param_type {
            ParamType::Integer => match value.as_i64() {
                Some(n) => Value::Integer(n),
                None => value,
            },
            ParamType::Boolean => match &value {
                Value::Boolean(_) => value,
                Value::Integer(i) => Value::Boolean(*i != 0),
                Value::String(s) if is_truthy_token(s) => Value::Boolean(true),
                Value::String(s) if is_falsy_token(s) => Value::Boolean(false),
                _ => value,
            },
            ParamType::String => match value {
                Value::String(_) => value,
                Value::Integer(i) => Value::String(i.to_string()),
                Value::Boolean(b) => Value::String(b.to_string()),
                other => other,
            },
        }
    }

    /// Read-only introspection export for authoring tools
    pub fn specification(&self) -> GrammarSpec {
        let mut parameters: Vec<ParameterSpec> = self
            .definitions
            .values()
            .map(|def| ParameterSpec {
                name: def.name,
                required: def.required,
                param_type: def.param_type,
                default: def.default.as_ref().map(Value::to_json),
                enum_values: def.enum_values.map(|v| v.to_vec()),
                min: def.min,
                max: def.max,
                description: def.description,
            })
            .collect();
        parameters.sort_by_key(|p| p.name);

        GrammarSpec {
            syntax: SYNTAX_SHAPE,
            placeholder_sources: vec!["GET", "POST", "ENV", "SESSION", "COOKIE"],
            truthy_tokens: crate::utils::TRUTHY_TOKENS.to_vec(),
            falsy_tokens: crate::utils::FALSY_TOKENS.to_vec(),
            parameters,
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}
