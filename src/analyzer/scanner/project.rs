use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::file_scanner::walker;
use crate::constants::scanner as scanner_constants;

/// Broad project category, used to pick extensions, priority files and
/// prompt wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Frontend,
    Backend,
    #[default]
    Mixed,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Mixed => "mixed",
        }
    }

    /// File extensions considered for this project type
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Frontend => scanner_constants::FRONTEND_EXTENSIONS,
            Self::Backend => scanner_constants::BACKEND_EXTENSIONS,
            Self::Mixed => scanner_constants::SUPPORTED_EXTENSIONS,
        }
    }

    /// File names discovered ahead of everything else
    pub fn priority_files(&self) -> Vec<&'static str> {
        match self {
            Self::Frontend => scanner_constants::FRONTEND_PRIORITY_FILES.to_vec(),
            Self::Backend => scanner_constants::BACKEND_PRIORITY_FILES.to_vec(),
            Self::Mixed => {
                let mut names = scanner_constants::FRONTEND_PRIORITY_FILES.to_vec();
                for name in scanner_constants::BACKEND_PRIORITY_FILES {
                    if !names.contains(name) {
                        names.push(name);
                    }
                }
                names
            }
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "frontend" => Ok(Self::Frontend),
            "backend" => Ok(Self::Backend),
            "mixed" => Ok(Self::Mixed),
            _ => Err(format!(
                "Invalid project type '{}'. Valid values: frontend, backend, mixed",
                s
            )),
        }
    }
}

/// Infer the project type from manifest and lock files anywhere in the tree.
///
/// Both kinds of indicator, or neither, yield [`ProjectType::Mixed`].
pub fn detect_project_type(root: &Path) -> ProjectType {
    let mut frontend = false;
    let mut backend = false;

    for entry in walker(root).filter_map(|e| e.ok()) {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        frontend |= scanner_constants::FRONTEND_INDICATORS.contains(&name);
        backend |= scanner_constants::BACKEND_INDICATORS.contains(&name);
        if frontend && backend {
            break;
        }
    }

    let detected = match (frontend, backend) {
        (true, false) => ProjectType::Frontend,
        (false, true) => ProjectType::Backend,
        _ => ProjectType::Mixed,
    };
    debug!("Detected project type: {}", detected);
    detected
}
