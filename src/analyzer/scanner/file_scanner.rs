use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use super::project::ProjectType;
use crate::constants::scanner as scanner_constants;
use crate::types::{DocError, Result};

/// Ordered file discovery for one documentation run.
///
/// Honors `.gitignore`, skips the fixed ignored-directory list, keeps only
/// extensions relevant to the project type and puts well-known entry and
/// manifest files first.
pub struct FileScanner {
    root: PathBuf,
    project_type: ProjectType,
    max_files: usize,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            project_type: ProjectType::Mixed,
            max_files: usize::MAX,
        }
    }

    pub fn with_project_type(mut self, project_type: ProjectType) -> Self {
        self.project_type = project_type;
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover files: priority files first, then the rest in path order,
    /// truncated to `max_files`.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(DocError::Analysis(format!(
                "Invalid directory: {}",
                self.root.display()
            )));
        }

        let priority_names = self.project_type.priority_files();
        let extensions = self.project_type.extensions();

        let mut priority = Vec::new();
        let mut regular = Vec::new();

        for entry in walker(&self.root).filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let is_priority = priority_names.contains(&name);
            let has_extension = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.contains(&ext));

            if !is_priority && !has_extension {
                continue;
            }

            if !within_size_limit(path) {
                continue;
            }

            if is_priority {
                priority.push(path.to_path_buf());
            } else {
                regular.push(path.to_path_buf());
            }
        }

        priority.extend(regular);
        priority.truncate(self.max_files);
        Ok(priority)
    }

    /// Discovered files as paths relative to the root
    pub fn relative_paths(&self) -> Result<Vec<String>> {
        Ok(self
            .scan()?
            .iter()
            .filter_map(|p| relative_path(&self.root, p))
            .collect())
    }
}

fn within_size_limit(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.len() <= scanner_constants::MAX_FILE_SIZE)
        .unwrap_or(false)
}

/// Gitignore-aware walk that never descends into ignored directories
pub(super) fn walker(root: &Path) -> ignore::Walk {
    WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false) // Security: prevent symlink traversal attacks
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| scanner_constants::IGNORED_DIRECTORIES.contains(&name)))
        })
        .build()
}

/// `/`-separated path of `path` relative to `root`
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(|p| {
        p.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_priority_files_come_first() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a_utils.py", "x = 1");
        write(dir.path(), "src/service.py", "y = 2");
        write(dir.path(), "requirements.txt", "requests");

        let paths = FileScanner::new(dir.path())
            .with_project_type(ProjectType::Backend)
            .relative_paths()
            .unwrap();
        assert_eq!(paths, vec!["requirements.txt", "a_utils.py", "src/service.py"]);
    }

    #[test]
    fn test_ignored_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.js", "function main() {}");
        write(dir.path(), "node_modules/lib/index.js", "module.exports = {}");
        write(dir.path(), "dist/bundle.js", "");
        write(dir.path(), "notes.txt", "not code");

        let paths = FileScanner::new(dir.path()).relative_paths().unwrap();
        assert_eq!(paths, vec!["app.js"]);
    }

    #[test]
    fn test_frontend_filters_backend_extensions() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.py", "print(1)");
        write(dir.path(), "app.tsx", "export const App = () => null;");

        let paths = FileScanner::new(dir.path())
            .with_project_type(ProjectType::Frontend)
            .relative_paths()
            .unwrap();
        assert_eq!(paths, vec!["app.tsx"]);
    }

    #[test]
    fn test_max_files_truncates() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("m{}.py", i), "pass");
        }
        let paths = FileScanner::new(dir.path())
            .with_max_files(2)
            .relative_paths()
            .unwrap();
        assert_eq!(paths, vec!["m0.py", "m1.py"]);
    }

    #[test]
    fn test_oversized_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "small.py", "pass");
        let limit = scanner_constants::MAX_FILE_SIZE as usize;
        write(dir.path(), "generated.py", &"#".repeat(limit + 1));
        write(dir.path(), "exact.py", &"#".repeat(limit));

        let paths = FileScanner::new(dir.path()).relative_paths().unwrap();
        assert_eq!(paths, vec!["exact.py", "small.py"]);
    }

    #[test]
    fn test_invalid_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            FileScanner::new(&missing).scan(),
            Err(DocError::Analysis(_))
        ));
    }
}
