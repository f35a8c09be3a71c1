//! Dependency Graph
//!
//! File-level dependencies resolved from the import elements of an index.
//! An import resolves to another indexed file when its origin starts with a
//! trailing part of that file's module path: `helpers.add` resolves to
//! `pkg/helpers.py`, `./utils` to `src/utils.js`. The longest matching
//! suffix wins; ties go to the first path in sorted order. Imports of
//! anything outside the snapshot stay unresolved.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::Serialize;

use crate::constants::architecture::{DEPENDENCY_WEIGHT, RELATED_FILE_WEIGHT};
use crate::constants::scanner::SUPPORTED_EXTENSIONS;
use crate::types::{CodeElement, ElementKind};

/// One import and where it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub source_file: String,
    /// Origin as written in the import (`helpers.add`, `./utils`)
    pub origin: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
    /// Functions and types of the target file the import names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_elements: Vec<String>,
}

/// Share of all indexed elements that live in two related files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCoupling {
    pub source: String,
    pub target: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralElement {
    pub name: String,
    pub file: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependencies: Vec<Dependency>,
    relationships: BTreeMap<String, BTreeSet<String>>,
    elements_per_file: BTreeMap<String, usize>,
    total_elements: usize,
}

impl DependencyGraph {
    /// Resolve every import element against the files the elements came from
    pub fn build(elements: &[CodeElement]) -> Self {
        let mut elements_per_file: BTreeMap<String, usize> = BTreeMap::new();
        let mut defined: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for element in elements {
            *elements_per_file.entry(element.file.clone()).or_default() += 1;
            if element.kind != ElementKind::Import {
                defined
                    .entry(element.file.as_str())
                    .or_default()
                    .insert(element.name.as_str());
            }
        }

        let modules: Vec<(&str, Vec<String>)> = elements_per_file
            .keys()
            .map(|file| (file.as_str(), module_segments(file)))
            .collect();

        let mut dependencies = Vec::new();
        let mut relationships: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for import in elements.iter().filter(|e| e.kind == ElementKind::Import) {
            let origin = import
                .annotations
                .first()
                .cloned()
                .unwrap_or_else(|| import.name.clone());
            let wanted = origin_segments(&origin);

            let resolved = resolve(&wanted, &import.file, &modules);
            let target_elements: Vec<String> = resolved
                .map(|(file, rest)| {
                    let names = defined.get(file);
                    imported_symbols(import, rest)
                        .into_iter()
                        .filter(|symbol| names.is_some_and(|n| n.contains(symbol.as_str())))
                        .collect()
                })
                .unwrap_or_default();

            if let Some((file, _)) = resolved {
                relationships
                    .entry(import.file.clone())
                    .or_default()
                    .insert(file.to_string());
            }

            dependencies.push(Dependency {
                source_file: import.file.clone(),
                origin,
                line: import.line,
                target_file: resolved.map(|(file, _)| file.to_string()),
                target_elements,
            });
        }

        Self {
            dependencies,
            relationships,
            elements_per_file,
            total_elements: elements.len(),
        }
    }

    /// Every import, resolved or not, in extraction order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Source file to the indexed files it imports
    pub fn relationships(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.relationships
    }

    pub fn edge_count(&self) -> usize {
        self.relationships.values().map(BTreeSet::len).sum()
    }

    /// Files `file` imports
    pub fn dependencies_of(&self, file: &str) -> impl Iterator<Item = &str> {
        self.relationships
            .get(file)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Files that import `file`
    pub fn dependents_of<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a str> {
        self.relationships
            .iter()
            .filter(move |(_, targets)| targets.contains(file))
            .map(|(source, _)| source.as_str())
    }

    pub fn depends_on(&self, source: &str, target: &str) -> bool {
        self.relationships
            .get(source)
            .is_some_and(|targets| targets.contains(target))
    }

    /// Coupling of each related file pair, strongest first
    pub fn coupling(&self) -> Vec<FileCoupling> {
        if self.total_elements == 0 {
            return Vec::new();
        }

        let count = |file: &str| self.elements_per_file.get(file).copied().unwrap_or(0);
        let mut pairs: Vec<FileCoupling> = self
            .relationships
            .iter()
            .flat_map(|(source, targets)| {
                targets.iter().map(move |target| FileCoupling {
                    source: source.clone(),
                    target: target.clone(),
                    score: (count(source) + count(target)) as f64 / self.total_elements as f64,
                })
            })
            .collect();
        pairs.sort_by(|a, b| b.score.total_cmp(&a.score));
        pairs
    }

    /// Functions and types ranked by how many imports name them, plus how
    /// many files their own file depends on. Elements scoring zero are left
    /// out.
    pub fn central_elements(&self, elements: &[CodeElement], top_n: usize) -> Vec<CentralElement> {
        let mut incoming: HashMap<(&str, &str), usize> = HashMap::new();
        for dependency in &self.dependencies {
            let Some(target) = &dependency.target_file else {
                continue;
            };
            for name in &dependency.target_elements {
                *incoming.entry((target.as_str(), name.as_str())).or_default() += 1;
            }
        }

        let mut ranked: Vec<CentralElement> = elements
            .iter()
            .filter(|e| e.kind != ElementKind::Import)
            .map(|e| {
                let imported = incoming
                    .get(&(e.file.as_str(), e.name.as_str()))
                    .copied()
                    .unwrap_or(0);
                let related = self.relationships.get(&e.file).map_or(0, BTreeSet::len);
                CentralElement {
                    name: e.name.clone(),
                    file: e.file.clone(),
                    score: DEPENDENCY_WEIGHT * imported as f64
                        + RELATED_FILE_WEIGHT * related as f64,
                }
            })
            .filter(|c| c.score > 0.0)
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        ranked.truncate(top_n);
        ranked
    }
}

/// `pkg/helpers.py` -> `["pkg", "helpers"]`; package entry files
/// (`__init__.py`, `index.js`) stand for their directory
fn module_segments(file: &str) -> Vec<String> {
    let mut segments: Vec<String> = strip_source_extension(file)
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect();
    if segments.len() > 1
        && segments
            .last()
            .is_some_and(|last| last == "__init__" || last == "index")
    {
        segments.pop();
    }
    segments
}

/// `..pkg.helpers` -> `["pkg", "helpers"]`, `../lib/api.js` -> `["lib", "api"]`
fn origin_segments(origin: &str) -> Vec<String> {
    let trimmed = origin.trim_start_matches(['.', '/']);
    let trimmed = if origin.contains('/') {
        strip_source_extension(trimmed)
    } else {
        trimmed
    };
    trimmed
        .split(['.', '/'])
        .filter(|s| !s.is_empty() && *s != "..")
        .map(str::to_string)
        .collect()
}

fn strip_source_extension(path: &str) -> &str {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext) => &path[..path.len() - ext.len() - 1],
        _ => path,
    }
}

/// The best matching file and the origin segments left after its module path
fn resolve<'a, 'w>(
    wanted: &'w [String],
    source_file: &str,
    modules: &'a [(&'a str, Vec<String>)],
) -> Option<(&'a str, &'w [String])> {
    let mut best: Option<(&'a str, usize)> = None;

    for (file, segments) in modules {
        if *file == source_file || segments.is_empty() {
            continue;
        }
        let matched = (1..=segments.len())
            .rev()
            .find(|&k| wanted.starts_with(&segments[segments.len() - k..]));
        // At most one trailing symbol after the module path
        if let Some(k) = matched
            && wanted.len() - k <= 1
            && best.is_none_or(|(_, current)| k > current)
        {
            best = Some((*file, k));
        }
    }

    best.map(|(file, k)| (file, &wanted[k..]))
}

/// Names an import brings in: the trailing origin segment for
/// `from m import f`, otherwise the identifiers of the binding text
/// (`{ add, sub as minus }`)
fn imported_symbols(import: &CodeElement, rest: &[String]) -> Vec<String> {
    if let Some(symbol) = rest.first() {
        return vec![symbol.clone()];
    }
    import
        .name
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|s| !s.is_empty() && *s != "as")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parser::ExtractorRegistry;
    use crate::analyzer::{CodeElementIndex, SourceFile};

    fn import(name: &str, file: &str, origin: &str) -> CodeElement {
        CodeElement::new(name, ElementKind::Import, file, 1).with_annotations(vec![origin.into()])
    }

    fn function(name: &str, file: &str) -> CodeElement {
        CodeElement::new(name, ElementKind::Function, file, 1)
    }

    #[test]
    fn test_module_paths() {
        assert_eq!(module_segments("pkg/helpers.py"), vec!["pkg", "helpers"]);
        assert_eq!(module_segments("pkg/__init__.py"), vec!["pkg"]);
        assert_eq!(module_segments("src/utils/index.js"), vec!["src", "utils"]);
        assert_eq!(origin_segments("..pkg.helpers"), vec!["pkg", "helpers"]);
        assert_eq!(origin_segments("../lib/api.js"), vec!["lib", "api"]);
        assert_eq!(origin_segments("./utils"), vec!["utils"]);
    }

    #[test]
    fn test_python_imports_resolve_to_files() {
        let files = vec![
            SourceFile::new(
                "app/main.py",
                "import os\nfrom app.helpers import add\nfrom .models import User\n\ndef run():\n    return add(1, 2)\n",
            ),
            SourceFile::new("app/helpers.py", "def add(a, b):\n    return a + b\n"),
            SourceFile::new("app/models.py", "class User:\n    pass\n"),
        ];
        let index = CodeElementIndex::build(&ExtractorRegistry::with_defaults().unwrap(), &files);
        let graph = index.dependency_graph();

        assert_eq!(graph.dependencies().len(), 3);
        assert_eq!(graph.dependencies()[0].target_file, None);
        assert_eq!(
            graph.dependencies()[1].target_file.as_deref(),
            Some("app/helpers.py")
        );
        assert_eq!(graph.dependencies()[1].target_elements, vec!["add"]);
        assert!(graph.depends_on("app/main.py", "app/models.py"));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(
            graph.dependents_of("app/helpers.py").collect::<Vec<_>>(),
            vec!["app/main.py"]
        );
    }

    #[test]
    fn test_javascript_bindings_name_target_elements() {
        let elements = vec![
            import("{ add, sub as minus }", "src/app.js", "./utils/math.js"),
            function("add", "src/utils/math.js"),
            function("sub", "src/utils/math.js"),
            function("render", "src/app.js"),
        ];
        let graph = DependencyGraph::build(&elements);

        let dependency = &graph.dependencies()[0];
        assert_eq!(dependency.target_file.as_deref(), Some("src/utils/math.js"));
        assert_eq!(dependency.target_elements, vec!["add", "sub"]);
        assert_eq!(
            graph.dependencies_of("src/app.js").collect::<Vec<_>>(),
            vec!["src/utils/math.js"]
        );
    }

    #[test]
    fn test_self_and_external_imports_stay_unresolved() {
        let elements = vec![
            import("helpers", "helpers.py", "helpers"),
            import("requests", "helpers.py", "requests"),
            function("fetch", "helpers.py"),
        ];
        let graph = DependencyGraph::build(&elements);
        assert!(graph.dependencies().iter().all(|d| d.target_file.is_none()));
        assert!(graph.relationships().is_empty());
        assert!(graph.coupling().is_empty());
    }

    #[test]
    fn test_longest_module_suffix_wins() {
        let elements = vec![
            import("helpers", "main.py", "pkg.helpers"),
            function("helpers", "pkg.py"),
            function("b", "pkg/helpers.py"),
        ];
        let graph = DependencyGraph::build(&elements);
        assert_eq!(
            graph.dependencies()[0].target_file.as_deref(),
            Some("pkg/helpers.py")
        );
    }

    #[test]
    fn test_coupling_and_central_elements() {
        let elements = vec![
            import("add", "main.py", "helpers.add"),
            import("sub", "cli.py", "helpers.sub"),
            import("add", "cli.py", "helpers.add"),
            function("run", "main.py"),
            function("add", "helpers.py"),
            function("sub", "helpers.py"),
        ];
        let graph = DependencyGraph::build(&elements);

        let coupling = graph.coupling();
        assert_eq!(coupling.len(), 2);
        assert_eq!(coupling[0].source, "cli.py");
        assert!((coupling[0].score - 4.0 / 6.0).abs() < 1e-9);
        assert!((coupling[1].score - 4.0 / 6.0).abs() < 1e-9);

        let central = graph.central_elements(&elements, 2);
        assert_eq!(central.len(), 2);
        assert_eq!(central[0].name, "add");
        assert!((central[0].score - 2.0).abs() < 1e-9);
        assert_eq!(central[1].name, "sub");
        assert!((central[1].score - 1.0).abs() < 1e-9);
    }
}
