//! Code Element Index
//!
//! Immutable catalog of every element extracted from one source snapshot,
//! with exact and case-insensitive name lookup and the dependency graph its
//! imports resolve to.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use super::architecture::{ArchitecturePattern, detect_architecture};
use super::graph::{CentralElement, DependencyGraph};
use super::parser::{ExtractorRegistry, Fidelity};
use super::scanner::SourceFile;
use crate::types::{CodeElement, ElementKind};

/// How many files were indexed at each fidelity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FidelitySummary {
    pub exact_files: usize,
    pub heuristic_files: usize,
    pub skipped_files: usize,
}

impl FidelitySummary {
    fn record(&mut self, fidelity: Fidelity) {
        match fidelity {
            Fidelity::Exact => self.exact_files += 1,
            Fidelity::Heuristic => self.heuristic_files += 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeElementIndex {
    elements: Vec<CodeElement>,
    exact: HashMap<String, usize>,
    lowercase: HashMap<String, usize>,
    graph: DependencyGraph,
    fidelity: FidelitySummary,
}

impl CodeElementIndex {
    /// Extract and index elements from `files`.
    ///
    /// Files without an extractor are skipped; a file whose extraction fails
    /// is logged and skipped. When names collide the first occurrence wins
    /// for lookups.
    pub fn build(registry: &ExtractorRegistry, files: &[SourceFile]) -> Self {
        let mut elements = Vec::new();
        let mut fidelity = FidelitySummary::default();

        for file in files {
            let Some(extractor) = registry.extractor_for(&file.path) else {
                fidelity.skipped_files += 1;
                continue;
            };

            match extractor.extract(file) {
                Ok(found) => {
                    debug!("Extracted {} elements from {}", found.len(), file.path);
                    fidelity.record(extractor.fidelity());
                    elements.extend(found);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", file.path, e);
                    fidelity.skipped_files += 1;
                }
            }
        }

        Self::from_elements(elements, fidelity)
    }

    fn from_elements(elements: Vec<CodeElement>, fidelity: FidelitySummary) -> Self {
        let mut exact = HashMap::new();
        let mut lowercase = HashMap::new();
        for (i, element) in elements.iter().enumerate() {
            exact.entry(element.name.clone()).or_insert(i);
            lowercase.entry(element.name.to_lowercase()).or_insert(i);
        }

        let graph = DependencyGraph::build(&elements);
        debug!(
            "Resolved {} of {} imports",
            graph.dependencies().iter().filter(|d| d.target_file.is_some()).count(),
            graph.dependencies().len()
        );

        Self {
            elements,
            exact,
            lowercase,
            graph,
            fidelity,
        }
    }

    pub fn elements(&self) -> &[CodeElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains_exact(&self, name: &str) -> bool {
        self.exact.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&CodeElement> {
        self.exact.get(name).map(|&i| &self.elements[i])
    }

    /// First element whose name equals `name` ignoring case
    pub fn find_case_insensitive(&self, name: &str) -> Option<&CodeElement> {
        self.lowercase
            .get(&name.to_lowercase())
            .map(|&i| &self.elements[i])
    }

    /// Functions and types not prefixed with `_`, in extraction order
    pub fn public_elements(&self) -> impl Iterator<Item = &CodeElement> {
        self.elements.iter().filter(|e| e.is_public())
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.elements.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn fidelity_summary(&self) -> FidelitySummary {
        self.fidelity
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn architecture_patterns(&self) -> Vec<ArchitecturePattern> {
        detect_architecture(&self.elements)
    }

    pub fn central_elements(&self, top_n: usize) -> Vec<CentralElement> {
        self.graph.central_elements(&self.elements, top_n)
    }

    /// Functions and types named exactly `name` ignoring case, one per file
    pub fn definitions_ignoring_case(&self, name: &str) -> Vec<&CodeElement> {
        let wanted = name.to_lowercase();
        let mut seen = BTreeSet::new();
        self.elements
            .iter()
            .filter(|e| e.kind != ElementKind::Import && e.name.to_lowercase() == wanted)
            .filter(|e| seen.insert(e.file.as_str()))
            .collect()
    }
}
