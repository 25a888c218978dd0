//! Embedded content query micro-language
//!
//! Compiles short template directives like `type=post limit=5 format=card
//! layout=grid-3` into validated, typed, cached content queries, executes
//! them against pluggable content sources, and renders the results into
//! HTML fragments for a host template engine.
//!
//! # Features
//!
//! - Lenient lexer and recovering parser: syntax errors accumulate as
//!   data, never as exceptions
//! - Closed grammar of ~27 typed parameters with validation, defaulting,
//!   and lossless type normalization
//! - `{GET:key}`-style runtime placeholders resolved from an injectable
//!   context, HTML-escaped on the way in
//! - Deterministic cache keys and a cache-aware executor with
//!   failure-as-data semantics
//! - Two-stage HTML rendering: per-item format plus structural layout
//! - Grammar introspection export for authoring tools
//! - In-memory diagnostic logger for authoring-time debugging
//!
//! # Basic Usage
//!
//! ```rust
//! use ikbq::{Compiler, RuntimeContext};
//!
//! let compiler = Compiler::new();
//! let query = compiler.compile("type=post limit=5", &RuntimeContext::new());
//! assert!(query.errors.is_empty());
//! ```
//!
//! # Pipeline
//!
//! One compile+execute+render cycle runs synchronously:
//!
//! 1. **Lexer** - directive string to token stream (total, lenient)
//! 2. **Parser** - tokens to raw attribute map, errors as data
//! 3. **Resolver** - placeholders replaced from runtime/ambient context
//! 4. **Validator** - grammar checks accumulate into the error list
//! 5. **Defaulting & optimization** - absent parameters filled, types
//!    normalized, cache key stamped
//! 6. **Executor** - cache lookup, adapter dispatch on miss
//! 7. **Bridge** - format rendering wrapped in a layout container

pub mod error;
pub mod types;
pub mod utils;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod compiler;
pub mod cache;
pub mod source;
pub mod executor;
pub mod renderer;
pub mod layout;
pub mod bridge;
pub mod logger;

// Re-export commonly used types and functions
pub use error::{QueryError, Result};
pub use types::{
    CacheEntry, CompiledQuery, ExecutionResult, NormalizedItem, Placeholder, PlaceholderSource,
    RuntimeContext, Value, CACHE_KEY_PREFIX,
};
pub use grammar::{Grammar, GrammarSpec, ParamType, ParameterDefinition};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParsedDirective, Parser};
pub use resolver::AmbientContext;
pub use compiler::{Compiler, DebugCompilation};
pub use cache::{CacheStore, MemoryCacheStore};
pub use source::{ContentSource, RawRecord, SourceRegistry};
pub use executor::Executor;
pub use renderer::{Format, FormatRenderer, NO_RESULTS_FRAGMENT};
pub use layout::{Gap, Layout, LayoutEngine, LayoutOptions, LAYOUT_STYLESHEET};
pub use bridge::{is_valid_combination, normalize_item, render_items, render_result};
pub use logger::{DiagnosticLogger, LogEntry, LogLevel, LogStats};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Convenience façade owning one compiler and one executor, for hosts
/// that want the whole directive-to-HTML cycle in a single call. The
/// individual stages stay available for hosts that need to inspect
/// compilation errors before executing.
pub struct QueryEngine {
    compiler: Compiler,
    executor: Executor,
}

impl QueryEngine {
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            compiler: Compiler::new(),
            executor: Executor::new(registry),
        }
    }

    pub fn with_parts(compiler: Compiler, executor: Executor) -> Self {
        Self { compiler, executor }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn executor_mut(&mut self) -> &mut Executor {
        &mut self.executor
    }

    /// Compile and execute a directive, returning the structured result
    pub fn run(&mut self, directive: &str, context: &RuntimeContext) -> (CompiledQuery, ExecutionResult) {
        let query = self.compiler.compile(directive, context);
        let result = self.executor.execute(&query);
        (query, result)
    }

    /// Full directive-to-HTML cycle. Never raises: execution and render
    /// failures degrade to HTML comments.
    pub fn render(&mut self, directive: &str, context: &RuntimeContext) -> String {
        let (query, result) = self.run(directive, context);
        bridge::render_result(&result, &query.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct StubSource {
        booted: bool,
        count: usize,
    }

    impl ContentSource for StubSource {
        fn kind(&self) -> &str {
            "rest"
        }

        fn is_booted(&self) -> bool {
            self.booted
        }

        fn boot(&mut self) -> Result<()> {
            self.booted = true;
            Ok(())
        }

        fn query(&self, _attributes: &HashMap<String, Value>) -> Result<Vec<RawRecord>> {
            Ok((0..self.count)
                .map(|i| {
                    json!({
                        "title": format!("Post {}", i + 1),
                        "excerpt": "An excerpt",
                        "permalink": format!("https://example.test/{}", i + 1),
                        "date": "2024-01-15",
                    })
                })
                .collect())
        }
    }

    fn engine(count: usize) -> QueryEngine {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut registry = SourceRegistry::new();
        registry.register("rest", Box::new(StubSource { booted: false, count }));
        QueryEngine::new(registry)
    }

    #[test]
    fn test_end_to_end_grid_of_cards() {
        let mut engine = engine(3);
        let (query, result) = engine.run(
            "type=post limit=3 format=card layout=grid-3 cache=false",
            &RuntimeContext::new(),
        );
        assert!(query.errors.is_empty());
        assert!(result.success);
        assert!(!result.cached);
        assert_eq!(result.items.len(), 3);

        let html = bridge::render_items(&result.items, &query.attributes);
        assert_eq!(html.matches(r#"class="ikb-item ikb-item--card""#).count(), 3);
        assert_eq!(html.matches("ikb-layout--grid-3").count(), 1);
        assert!(html.contains("ikb-layout--gap-medium"));
    }

    #[test]
    fn test_render_facade_never_raises() {
        // No registered source: the page region degrades to a comment
        let mut engine = QueryEngine::new(SourceRegistry::new());
        let html = engine.render("type=post", &RuntimeContext::new());
        assert!(html.starts_with("<!--"));
        assert!(html.contains("no content source"));
    }

    #[test]
    fn test_empty_result_renders_no_results_fragment() {
        let mut engine = engine(0);
        let html = engine.render("type=post cache=false", &RuntimeContext::new());
        assert_eq!(html, NO_RESULTS_FRAGMENT);
    }

    #[test]
    fn test_placeholder_flows_through_whole_cycle() {
        let mut context = RuntimeContext::new();
        context.get.insert("t".to_string(), "news".to_string());
        let mut engine = engine(1);
        let (query, result) = engine.run("type={GET:t} cache=false", &context);
        assert_eq!(
            query.attributes.get("type"),
            Some(&Value::String("news".to_string()))
        );
        assert!(result.success);
    }

    #[test]
    fn test_second_run_hits_cache() {
        let mut engine = engine(2);
        let context = RuntimeContext::new();
        let (_, first) = engine.run("type=post limit=2", &context);
        let (_, second) = engine.run("type=post limit=2", &context);
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.items, second.items);
    }
}
