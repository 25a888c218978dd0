//! Compilation pipeline orchestration
//!
//! Fixed phase order, each stage feeding the next:
//!
//! 1. Lexing - directive string to token stream
//! 2. Parsing - tokens to raw attribute map, syntax errors as data
//! 3. Resolution - placeholders replaced from runtime/ambient context
//! 4. Validation - grammar checks, errors accumulated, nothing dropped
//! 5. Defaulting - absent parameters filled from grammar defaults
//! 6. Optimization - lossless type normalization per the grammar

use crate::grammar::Grammar;
use crate::lexer::{Lexer, Token};
use crate::parser::Parser;
use crate::resolver::{resolve_value, AmbientContext};
use crate::types::{CompiledQuery, RuntimeContext, Value, CACHE_KEY_PREFIX};
use std::collections::HashMap;
use std::time::Instant;

pub struct Compiler {
    grammar: Grammar,
    ambient: AmbientContext,
}

/// Extended compilation output for authoring tools: the raw token list
/// and the pre-resolution attribute map alongside the compiled query.
#[derive(Debug, Clone)]
pub struct DebugCompilation {
    pub tokens: Vec<Token>,
    pub raw_attributes: HashMap<String, Value>,
    pub query: CompiledQuery,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_ambient(AmbientContext::empty())
    }

    pub fn with_ambient(ambient: AmbientContext) -> Self {
        Self {
            grammar: Grammar::new(),
            ambient,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn compile(&self, directive: &str, context: &RuntimeContext) -> CompiledQuery {
        self.run_pipeline(directive, context).query
    }

    /// Same pipeline and side effects as `compile`, keeping the
    /// intermediate stages for tooling.
    pub fn compile_debug(&self, directive: &str, context: &RuntimeContext) -> DebugCompilation {
        self.run_pipeline(directive, context)
    }

    fn run_pipeline(&self, directive: &str, context: &RuntimeContext) -> DebugCompilation {
        let start = Instant::now();

        log::debug!("Compiling directive: {}", directive);

        // Phase 1: lexing
        let tokens = Lexer::new(directive).tokenize();
        log::debug!("Tokenized {} tokens", tokens.len());

        // Phase 2: parsing
        let parsed = Parser::new(tokens.clone()).parse();
        let raw_attributes = parsed.attributes.clone();
        let mut errors = parsed.errors;

        // Phase 3: placeholder resolution
        let mut attributes: HashMap<String, Value> = parsed
            .attributes
            .into_iter()
            .map(|(name, value)| (name, resolve_value(value, context, &self.ambient)))
            .collect();

        // Phase 4: validation. Unknown and invalid parameters are flagged
        // but never dropped; execution proceeds regardless.
        let mut names: Vec<&String> = attributes.keys().collect();
        names.sort();
        for name in names {
            if self.grammar.get(name).is_none() {
                errors.push(format!("Unknown parameter '{}'", name));
            } else if !self.grammar.validate(name, &attributes[name.as_str()]) {
                errors.push(format!(
                    "Invalid value for '{}': {}",
                    name, attributes[name.as_str()]
                ));
            }
        }

        // Required check runs before defaults are applied. A definition
        // that carries a default is skipped here, since defaulting would
        // satisfy it immediately anyway.
        for def in self.grammar.all().values() {
            if def.required && def.default.is_none() && !attributes.contains_key(def.name) {
                errors.push(format!("Required parameter missing: '{}'", def.name));
            }
        }

        // Phase 5: defaults
        for def in self.grammar.all().values() {
            if let Some(default) = &def.default {
                attributes
                    .entry(def.name.to_string())
                    .or_insert_with(|| default.clone());
            }
        }

        // Phase 6: type optimization
        for (name, value) in attributes.iter_mut() {
            let taken = std::mem::replace(value, Value::Null);
            *value = self.grammar.normalize(name, taken);
        }

        let cache_key = derive_cache_key(directive, context);
        let compiled_at_ms = start.elapsed().as_secs_f64() * 1000.0;

        if !errors.is_empty() {
            log::debug!("Compiled with {} error(s): {:?}", errors.len(), errors);
        }

        DebugCompilation {
            tokens,
            raw_attributes,
            query: CompiledQuery {
                attributes,
                errors,
                cache_key,
                compiled_at_ms,
            },
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic cache key: md5 over the prefixed directive text and the
/// serialized context. RuntimeContext serializes through BTreeMaps, so
/// identical contents always produce identical keys.
fn derive_cache_key(directive: &str, context: &RuntimeContext) -> String {
    let serialized = serde_json::to_string(context).unwrap_or_default();
    let digest = md5::compute(format!("{}{}{}", CACHE_KEY_PREFIX, directive, serialized));
    hex::encode(digest.0)
}
