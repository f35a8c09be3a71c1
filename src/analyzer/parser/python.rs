use tree_sitter::{Query, QueryCursor, StreamingIterator};
use tracing::warn;

use super::{ElementExtractor, Fidelity, Language, create_ts_parser, get_node_text, node_line};
use crate::analyzer::scanner::SourceFile;
use crate::types::{CodeElement, DocError, ElementKind, Result};

const ELEMENT_QUERY: &str = r#"
    (function_definition) @function
    (class_definition) @class
    (import_statement) @import
    (import_from_statement) @import_from
"#;

const FUNCTION_PATTERN: usize = 0;
const CLASS_PATTERN: usize = 1;
const IMPORT_PATTERN: usize = 2;
const IMPORT_FROM_PATTERN: usize = 3;

/// Syntax-tree extractor for Python sources
pub struct PythonExtractor {
    query: Query,
}

impl PythonExtractor {
    pub fn new() -> Result<Self> {
        // Validate that the language is available
        let _ = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        let query = Query::new(&tree_sitter_python::LANGUAGE.into(), ELEMENT_QUERY)
            .map_err(|e| DocError::parse("", format!("Invalid Python element query: {}", e)))?;
        Ok(Self { query })
    }
}

impl ElementExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Exact
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<CodeElement>> {
        let path = file.path.as_str();
        let content = file.content.as_bytes();

        let mut parser = create_ts_parser(tree_sitter_python::LANGUAGE, "Python").map_err(|e| {
            match e {
                DocError::Parse { message, .. } => DocError::parse(path, message),
                other => other,
            }
        })?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| DocError::parse(path, "Failed to parse Python file"))?;
        let root = tree.root_node();

        if root.has_error() {
            warn!("Syntax errors in {}; extracting well-formed parts only", path);
        }

        let mut elements = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, root, content);

        while let Some(m) = matches.next() {
            for cap in m.captures.iter() {
                let node = cap.node;
                if node.has_error() && node.child_by_field_name("name").is_none() {
                    continue;
                }
                match m.pattern_index {
                    FUNCTION_PATTERN => elements.extend(function_element(node, content, path)),
                    CLASS_PATTERN => elements.extend(class_element(node, content, path)),
                    IMPORT_PATTERN => import_elements(node, content, path, &mut elements),
                    IMPORT_FROM_PATTERN => import_from_elements(node, content, path, &mut elements),
                    _ => {}
                }
            }
        }

        Ok(elements)
    }
}

fn function_element(node: tree_sitter::Node, content: &[u8], path: &str) -> Option<CodeElement> {
    let name = get_node_text(node.child_by_field_name("name")?, content);
    if name.is_empty() {
        return None;
    }

    let parameters = node
        .child_by_field_name("parameters")
        .map(|params| parameter_names(params, content))
        .unwrap_or_default();
    let returns = node
        .child_by_field_name("return_type")
        .map(|t| get_node_text(t, content).to_string());

    Some(
        CodeElement::new(name, ElementKind::Function, path, node_line(node))
            .with_parameters(parameters)
            .with_returns(returns)
            .with_docstring(docstring(node, content)),
    )
}

fn class_element(node: tree_sitter::Node, content: &[u8], path: &str) -> Option<CodeElement> {
    let name = get_node_text(node.child_by_field_name("name")?, content);
    if name.is_empty() {
        return None;
    }

    let mut bases = Vec::new();
    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for base in superclasses.named_children(&mut cursor) {
            if base.kind() != "keyword_argument" && base.kind() != "comment" {
                bases.push(get_node_text(base, content).to_string());
            }
        }
    }

    let mut members = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            let definition = match child.kind() {
                "decorated_definition" => child.child_by_field_name("definition"),
                _ => Some(child),
            };
            if let Some(def) = definition.filter(|d| d.kind() == "function_definition")
                && let Some(method) = def.child_by_field_name("name")
            {
                members.push(get_node_text(method, content).to_string());
            }
        }
    }

    Some(
        CodeElement::new(name, ElementKind::Type, path, node_line(node))
            .with_annotations(bases)
            .with_members(members)
            .with_docstring(docstring(node, content)),
    )
}

/// `import a.b` and `import a.b as c`
fn import_elements(
    node: tree_sitter::Node,
    content: &[u8],
    path: &str,
    elements: &mut Vec<CodeElement>,
) {
    let line = node_line(node);
    let mut cursor = node.walk();
    for imported in node.children_by_field_name("name", &mut cursor) {
        if let Some((name, origin)) = imported_name(imported, content) {
            elements.push(
                CodeElement::new(name, ElementKind::Import, path, line)
                    .with_annotations(vec![origin]),
            );
        }
    }
}

/// `from m import a` and `from m import a as b`; wildcards are skipped
fn import_from_elements(
    node: tree_sitter::Node,
    content: &[u8],
    path: &str,
    elements: &mut Vec<CodeElement>,
) {
    let line = node_line(node);
    let module = node
        .child_by_field_name("module_name")
        .map(|m| get_node_text(m, content))
        .unwrap_or_default();

    let mut cursor = node.walk();
    for imported in node.children_by_field_name("name", &mut cursor) {
        if let Some((name, origin)) = imported_name(imported, content) {
            let origin = if module.is_empty() {
                origin
            } else if module.ends_with('.') {
                format!("{}{}", module, origin)
            } else {
                format!("{}.{}", module, origin)
            };
            elements.push(
                CodeElement::new(name, ElementKind::Import, path, line)
                    .with_annotations(vec![origin]),
            );
        }
    }
}

/// (bound name, dotted origin) for a `dotted_name` or `aliased_import`
fn imported_name(node: tree_sitter::Node, content: &[u8]) -> Option<(String, String)> {
    match node.kind() {
        "dotted_name" => {
            let dotted = get_node_text(node, content).to_string();
            (!dotted.is_empty()).then(|| (dotted.clone(), dotted))
        }
        "aliased_import" => {
            let origin = get_node_text(node.child_by_field_name("name")?, content).to_string();
            let alias = get_node_text(node.child_by_field_name("alias")?, content).to_string();
            (!alias.is_empty()).then_some((alias, origin))
        }
        _ => None,
    }
}

fn parameter_names(params: tree_sitter::Node, content: &[u8]) -> Vec<String> {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter_map(|param| {
            let name_node = match param.kind() {
                "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => Some(param),
                "typed_parameter" => param.named_child(0),
                "default_parameter" | "typed_default_parameter" => {
                    param.child_by_field_name("name")
                }
                _ => None,
            }?;
            let name = get_node_text(name_node, content);
            (!name.is_empty() && name != "self" && name != "cls").then(|| name.to_string())
        })
        .collect()
}

/// First statement of the body when it is a bare string literal
fn docstring(node: tree_sitter::Node, content: &[u8]) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0).filter(|n| n.kind() == "string")?;
    clean_docstring(strip_quotes(get_node_text(literal, content)))
}

fn strip_quotes(literal: &str) -> &str {
    let unprefixed = literal.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = unprefixed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    unprefixed
}

/// Trim the first line, dedent the rest by their common indent and drop
/// blank edges.
fn clean_docstring(raw: &str) -> Option<String> {
    let mut lines = raw.lines();
    let first = lines.next().unwrap_or_default().trim();
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned = vec![first.to_string()];
    cleaned.extend(
        rest.iter()
            .map(|l| l.get(indent..).unwrap_or("").trim_end().to_string()),
    );

    let text = cleaned.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}
