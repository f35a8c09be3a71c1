//! Code Discovery
//!
//! Finds the files a documentation run looks at and reads them into an
//! ordered, immutable snapshot.

pub mod file_scanner;
pub mod project;
pub mod reader;

pub use file_scanner::{FileScanner, relative_path};
pub use project::{ProjectType, detect_project_type};
pub use reader::{SourceFile, read_sources};
