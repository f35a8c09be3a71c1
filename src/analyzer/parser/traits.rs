use serde::{Deserialize, Serialize};

use super::Language;
use crate::analyzer::scanner::SourceFile;
use crate::types::{CodeElement, DocError, Result};

/// How faithfully an extractor reflects the language grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    /// Syntax-tree backed
    Exact,
    /// Pattern-matched; may miss or over-report elements
    Heuristic,
}

impl Fidelity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Pulls [`CodeElement`]s out of one source file.
pub trait ElementExtractor: Send + Sync {
    fn language(&self) -> Language;
    fn fidelity(&self) -> Fidelity;
    fn extract(&self, file: &SourceFile) -> Result<Vec<CodeElement>>;
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// 1-based line of a tree-sitter node
#[inline]
pub fn node_line(node: tree_sitter::Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// 1-based line containing byte `offset` of `content`
pub fn line_at_offset(content: &str, offset: usize) -> u32 {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() as u32 + 1
}

/// Create a tree-sitter parser for the given language.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| DocError::parse("", format!("Failed to set {} language: {}", lang_name, e)))?;
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_at_offset() {
        let content = "a\nbb\nccc";
        assert_eq!(line_at_offset(content, 0), 1);
        assert_eq!(line_at_offset(content, 2), 2);
        assert_eq!(line_at_offset(content, 5), 3);
        assert_eq!(line_at_offset(content, 100), 3);
    }

    #[test]
    fn test_create_ts_parser() {
        assert!(create_ts_parser(tree_sitter_python::LANGUAGE, "Python").is_ok());
    }
}
