use regex::Regex;

use super::{ElementExtractor, Fidelity, Language, line_at_offset};
use crate::analyzer::scanner::SourceFile;
use crate::types::{CodeElement, DocError, ElementKind, Result};

/// Pattern-based extractor for JavaScript and TypeScript sources.
///
/// Recognizes function declarations, arrow functions bound to a name,
/// classes, ES imports and `require` calls. A `/** ... */` block that ends
/// right before a declaration becomes its docstring.
pub struct JavaScriptExtractor {
    language: Language,
    function: Regex,
    arrow: Regex,
    class: Regex,
    import: Regex,
    require: Regex,
    jsdoc: Regex,
}

impl JavaScriptExtractor {
    pub fn new(language: Language) -> Result<Self> {
        Ok(Self {
            language,
            function: compile(r"function\s+(\w+)\s*\(([^)]*)\)")?,
            arrow: compile(r"(\w+)\s*=\s*(?:async\s*)?\(([^)]*)\)\s*=>")?,
            class: compile(r"class\s+(\w+)(?:\s+extends\s+([\w.]+))?\s*\{")?,
            import: compile(r#"import\s+(.+?)\s+from\s+['"](.+?)['"]"#)?,
            require: compile(r#"require\(['"](.+?)['"]\)"#)?,
            jsdoc: compile(r"/\*\*((?:[^*]|\*+[^*/])*)\*+/\s*$")?,
        })
    }

    /// JSDoc block immediately preceding byte `offset`, if any
    fn jsdoc_before(&self, content: &str, offset: usize) -> Option<String> {
        let line_start = content[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let prefix = &content[..line_start];
        let body = self.jsdoc.captures(prefix)?.get(1)?.as_str();

        let text = body
            .lines()
            .map(|line| line.trim().trim_start_matches('*').trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        (!text.is_empty()).then_some(text)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| DocError::parse("", format!("Invalid extractor pattern '{}': {}", pattern, e)))
}

fn split_params(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| {
            p.split(['=', ':'])
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

impl ElementExtractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        self.language
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Heuristic
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<CodeElement>> {
        let content = file.content.as_str();
        let path = file.path.as_str();
        let mut found: Vec<(usize, CodeElement)> = Vec::new();

        for caps in self.function.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let params = caps.get(2).map(|m| split_params(m.as_str())).unwrap_or_default();
            found.push((
                whole.start(),
                CodeElement::new(name.as_str(), ElementKind::Function, path, line_at_offset(content, whole.start()))
                    .with_parameters(params)
                    .with_docstring(self.jsdoc_before(content, whole.start())),
            ));
        }

        for caps in self.arrow.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let params = caps.get(2).map(|m| split_params(m.as_str())).unwrap_or_default();
            found.push((
                whole.start(),
                CodeElement::new(name.as_str(), ElementKind::Function, path, line_at_offset(content, whole.start()))
                    .with_parameters(params)
                    .with_docstring(self.jsdoc_before(content, whole.start())),
            ));
        }

        for caps in self.class.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let bases = caps
                .get(2)
                .map(|m| vec![m.as_str().to_string()])
                .unwrap_or_default();
            found.push((
                whole.start(),
                CodeElement::new(name.as_str(), ElementKind::Type, path, line_at_offset(content, whole.start()))
                    .with_annotations(bases)
                    .with_docstring(self.jsdoc_before(content, whole.start())),
            ));
        }

        for caps in self.import.captures_iter(content) {
            let (Some(whole), Some(bindings), Some(source)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            found.push((
                whole.start(),
                CodeElement::new(bindings.as_str().trim(), ElementKind::Import, path, line_at_offset(content, whole.start()))
                    .with_annotations(vec![source.as_str().to_string()]),
            ));
        }

        for caps in self.require.captures_iter(content) {
            let (Some(whole), Some(source)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            found.push((
                whole.start(),
                CodeElement::new(source.as_str(), ElementKind::Import, path, line_at_offset(content, whole.start()))
                    .with_annotations(vec![source.as_str().to_string()]),
            ));
        }

        found.sort_by_key(|(offset, _)| *offset);
        Ok(found.into_iter().map(|(_, element)| element).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"import React from 'react';
const fs = require("fs");

/**
 * Entry point.
 * Starts the app.
 */
function main(argv, opts = {}) {
  return run(argv);
}

const handleClick = (event) => {
  console.log(event);
};

class Widget extends Base {
  render() {}
}
"#;

    fn extract(content: &str) -> Vec<CodeElement> {
        JavaScriptExtractor::new(Language::JavaScript)
            .unwrap()
            .extract(&SourceFile::new("src/main.js", content))
            .unwrap()
    }

    #[test]
    fn test_elements_in_source_order() {
        let elements = extract(SAMPLE);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["React", "fs", "main", "handleClick", "Widget"]);
    }

    #[test]
    fn test_line_numbers_and_params() {
        let elements = extract(SAMPLE);
        let main = elements.iter().find(|e| e.name == "main").unwrap();
        assert_eq!(main.line, 8);
        assert_eq!(main.parameters, vec!["argv", "opts"]);

        let arrow = elements.iter().find(|e| e.name == "handleClick").unwrap();
        assert_eq!(arrow.line, 12);
        assert_eq!(arrow.parameters, vec!["event"]);
    }

    #[test]
    fn test_jsdoc_attaches_to_next_declaration() {
        let elements = extract(SAMPLE);
        let main = elements.iter().find(|e| e.name == "main").unwrap();
        assert_eq!(main.docstring.as_deref(), Some("Entry point.\nStarts the app."));

        let widget = elements.iter().find(|e| e.name == "Widget").unwrap();
        assert_eq!(widget.docstring, None);
        assert_eq!(widget.annotations, vec!["Base"]);
    }

    #[test]
    fn test_import_sources() {
        let elements = extract(SAMPLE);
        let imports: Vec<&str> = elements
            .iter()
            .filter(|e| e.kind == ElementKind::Import)
            .map(|e| e.annotations[0].as_str())
            .collect();
        assert_eq!(imports, vec!["react", "fs"]);
    }
}
