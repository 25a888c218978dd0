//! Content-source adapter contract and registry

use crate::error::Result;
use crate::types::Value;
use std::collections::HashMap;

/// A raw record as a content source returns it, before normalization
pub type RawRecord = serde_json::Value;

/// External collaborator that turns a compiled query's attributes into
/// raw content records. Adapters may fail; the executor converts every
/// failure into result data.
pub trait ContentSource: Send {
    /// Source kind used for field-alias selection during normalization
    /// (e.g. "wordpress", "rest", "filesystem")
    fn kind(&self) -> &str;

    fn is_booted(&self) -> bool;

    fn boot(&mut self) -> Result<()>;

    fn query(&self, attributes: &HashMap<String, Value>) -> Result<Vec<RawRecord>>;
}

/// Named adapter registry with one optional active default. The executor
/// resolves the adapter named by the `cms` attribute, falling back to the
/// active default.
#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Box<dyn ContentSource>>,
    active: Option<String>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under a name. The first registration becomes
    /// the active default; later ones can take over via `set_active`.
    pub fn register(&mut self, name: impl Into<String>, source: Box<dyn ContentSource>) {
        let name = name.into();
        if self.active.is_none() {
            self.active = Some(name.clone());
        }
        self.sources.insert(name, source);
    }

    pub fn set_active(&mut self, name: impl Into<String>) {
        self.active = Some(name.into());
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Resolve by explicit name, or the active default when none given
    pub fn resolve(&mut self, name: Option<&str>) -> Option<&mut Box<dyn ContentSource>> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.active.clone()?,
        };
        self.sources.get_mut(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubSource {
        booted: bool,
    }

    impl ContentSource for StubSource {
        fn kind(&self) -> &str {
            "stub"
        }

        fn is_booted(&self) -> bool {
            self.booted
        }

        fn boot(&mut self) -> Result<()> {
            self.booted = true;
            Ok(())
        }

        fn query(&self, _attributes: &HashMap<String, Value>) -> Result<Vec<RawRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_first_registration_becomes_active() {
        let mut registry = SourceRegistry::new();
        registry.register("alpha", Box::new(StubSource { booted: false }));
        registry.register("beta", Box::new(StubSource { booted: false }));
        assert_eq!(registry.active_name(), Some("alpha"));
        assert!(registry.resolve(None).is_some());
    }

    #[test]
    fn test_resolve_by_name_and_missing() {
        let mut registry = SourceRegistry::new();
        registry.register("alpha", Box::new(StubSource { booted: false }));
        assert!(registry.resolve(Some("alpha")).is_some());
        assert!(registry.resolve(Some("gamma")).is_none());
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let mut registry = SourceRegistry::new();
        assert!(registry.resolve(None).is_none());
    }
}
