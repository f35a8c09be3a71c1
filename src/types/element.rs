use serde::{Deserialize, Serialize};

/// Kind of named entity pulled out of source text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Function,
    Type,
    Import,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Type => "type",
            Self::Import => "import",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function, type or import found in one source file.
///
/// Built once per analysis pass and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeElement {
    pub name: String,
    pub kind: ElementKind,
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Base types for classes, the dotted origin for imports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    /// Method names for types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl CodeElement {
    pub fn new(
        name: impl Into<String>,
        kind: ElementKind,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            file: file.into(),
            line,
            parameters: Vec::new(),
            docstring: None,
            annotations: Vec::new(),
            returns: None,
            members: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<String>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<String>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_returns(mut self, returns: Option<String>) -> Self {
        self.returns = returns;
        self
    }

    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = members;
        self
    }

    /// Functions and types whose name is not underscore-prefixed
    pub fn is_public(&self) -> bool {
        matches!(self.kind, ElementKind::Function | ElementKind::Type) && !self.name.starts_with('_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_visibility() {
        assert!(CodeElement::new("calculate_sum", ElementKind::Function, "m.py", 1).is_public());
        assert!(!CodeElement::new("_helper", ElementKind::Function, "m.py", 1).is_public());
        assert!(!CodeElement::new("__init__", ElementKind::Function, "m.py", 1).is_public());
        assert!(!CodeElement::new("os", ElementKind::Import, "m.py", 1).is_public());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let element = CodeElement::new("Calculator", ElementKind::Type, "calc.py", 4);
        let json = serde_json::to_string(&element).unwrap();
        assert!(json.contains("\"kind\":\"type\""));
        assert!(!json.contains("parameters"));
    }
}
