//! Code Analyzer Module
//!
//! - File discovery with gitignore support and project-type detection
//! - Per-language element extraction
//! - The Code Element Index used for cross validation
//! - Import dependency graph and architecture pattern detection

pub mod architecture;
pub mod graph;
pub mod index;
pub mod parser;
pub mod scanner;

pub use architecture::{ArchitectureKind, ArchitecturePattern, detect_architecture};
pub use graph::{CentralElement, Dependency, DependencyGraph, FileCoupling};
pub use index::{CodeElementIndex, FidelitySummary};
pub use parser::{ElementExtractor, ExtractorRegistry, Fidelity, Language};
pub use scanner::{FileScanner, ProjectType, SourceFile, detect_project_type, read_sources};
