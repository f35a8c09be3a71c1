//! Element Extraction
//!
//! Per-language extractors that turn source text into [`CodeElement`]s.
//!
//! | Language | Extractor | Fidelity |
//! |----------|-----------|----------|
//! | Python | tree-sitter | exact |
//! | JavaScript / TypeScript | regex | heuristic |
//!
//! [`CodeElement`]: crate::types::CodeElement

pub mod javascript;
pub mod language;
pub mod python;
pub mod traits;

pub use javascript::JavaScriptExtractor;
pub use language::Language;
pub use python::PythonExtractor;
pub use traits::{
    ElementExtractor, Fidelity, create_ts_parser, get_node_text, line_at_offset, node_line,
};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::types::Result;

/// Shared extractor for thread-safe access
pub type SharedExtractor = Arc<dyn ElementExtractor>;

/// Extension → extractor lookup
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    by_extension: HashMap<String, SharedExtractor>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Python plus JavaScript/TypeScript
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(PythonExtractor::new()?));
        registry.register(Arc::new(JavaScriptExtractor::new(Language::JavaScript)?));
        registry.register(Arc::new(JavaScriptExtractor::new(Language::TypeScript)?));
        Ok(registry)
    }

    /// Register `extractor` for every extension of its language
    pub fn register(&mut self, extractor: SharedExtractor) {
        for ext in extractor.language().extensions() {
            self.by_extension.insert((*ext).to_string(), extractor.clone());
        }
    }

    pub fn extractor_for<P: AsRef<Path>>(&self, path: P) -> Option<&SharedExtractor> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension.get(&ext)
    }

    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_lookup() {
        let registry = ExtractorRegistry::with_defaults().unwrap();

        let py = registry.extractor_for("pkg/calc.py").unwrap();
        assert_eq!(py.language(), Language::Python);
        assert_eq!(py.fidelity(), Fidelity::Exact);

        let ts = registry.extractor_for("src/App.TSX").unwrap();
        assert_eq!(ts.language(), Language::TypeScript);
        assert_eq!(ts.fidelity(), Fidelity::Heuristic);

        assert!(registry.extractor_for("main.go").is_none());
        assert!(registry.extractor_for("README").is_none());
    }

    #[test]
    fn test_supported_extensions_sorted() {
        let registry = ExtractorRegistry::with_defaults().unwrap();
        let exts = registry.supported_extensions();
        assert!(exts.windows(2).all(|w| w[0] <= w[1]));
        assert!(exts.contains(&"mjs"));
    }
}
