//! Language Detection
//!
//! Maps file paths to the languages that have an element extractor.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

struct LanguageMeta {
    display_name: &'static str,
    extensions: &'static [&'static str],
}

/// Languages with element extraction support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    #[default]
    Unknown,
}

impl Language {
    fn meta(&self) -> LanguageMeta {
        match self {
            Language::Python => LanguageMeta {
                display_name: "Python",
                extensions: &["py", "pyi"],
            },
            Language::JavaScript => LanguageMeta {
                display_name: "JavaScript",
                extensions: &["js", "jsx", "mjs", "cjs"],
            },
            Language::TypeScript => LanguageMeta {
                display_name: "TypeScript",
                extensions: &["ts", "tsx"],
            },
            Language::Unknown => LanguageMeta {
                display_name: "Unknown",
                extensions: &[],
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.meta().display_name
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.meta().extensions
    }

    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_lowercase();
        [Language::Python, Language::JavaScript, Language::TypeScript]
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext_lower.as_str()))
            .unwrap_or(Language::Unknown)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
