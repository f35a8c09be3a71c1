//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Agent defaults (mirrored by `config::AgentConfig::default`)
pub mod agent {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Base backoff delay (seconds)
    pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;

    pub const DEFAULT_CRITIQUE_THRESHOLD: f64 = 0.8;

    pub const DEFAULT_CACHE_DIR: &str = ".cache";

    pub const DEFAULT_CACHE_MAX_AGE_HOURS: u64 = 24;

    pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 100;

    /// Per-call timeout for the generation service (seconds)
    pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;
}

/// Response cache constants
pub mod cache {
    /// Characters of the prompt kept in a cache record for debugging
    pub const PROMPT_PREVIEW_CHARS: usize = 200;

    /// Extension of cache record files
    pub const RECORD_EXTENSION: &str = "json";
}

/// Generation service endpoints and defaults
pub mod gateway {
    pub const LOCAL_ENDPOINT: &str = "http://localhost:11434/api/generate";

    pub const CLOUD_ENDPOINT: &str = "https://ollama.com/api/generate";

    pub const DEFAULT_MODEL: &str = "gpt-oss:120b-cloud";

    /// Connection timeout for the HTTP client (seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;

    /// Response keys that may carry the generated text, in lookup order
    pub const TEXT_KEYS: [&str; 2] = ["response", "text"];
}

/// Documentation run defaults
pub mod generation {
    pub const DEFAULT_MAX_FILES: usize = 30;

    pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

    /// Concurrent file reads while loading sources
    pub const DEFAULT_READ_CONCURRENCY: usize = 8;

    pub const DEFAULT_OUTPUT_STEM: &str = "documentation";
}

/// File discovery constants
pub mod scanner {
    /// Maximum file size to read (1MB)
    pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

    pub const SUPPORTED_EXTENSIONS: &[&str] = &[
        "py", "js", "ts", "tsx", "jsx", "mjs", "cjs", "java", "cs", "go", "php", "rb", "rs", "c",
        "cpp", "h", "hpp", "html", "css", "scss", "sql", "sh", "kt", "swift", "vue", "svelte",
        "xml", "gradle",
    ];

    pub const FRONTEND_EXTENSIONS: &[&str] = &[
        "js", "ts", "tsx", "jsx", "mjs", "cjs", "vue", "svelte", "html", "css", "scss",
    ];

    pub const BACKEND_EXTENSIONS: &[&str] = &[
        "py", "java", "cs", "go", "php", "rb", "rs", "c", "cpp", "h", "hpp", "kt", "swift", "sql",
    ];

    pub const IGNORED_DIRECTORIES: &[&str] = &[
        "node_modules",
        ".git",
        ".vscode",
        ".idea",
        "__pycache__",
        "dist",
        "build",
        "target",
        "out",
        "bin",
        "obj",
        "vendor",
        "tmp",
        "temp",
        ".next",
        "docs",
        "coverage",
        ".pytest_cache",
        ".cache",
    ];

    pub const FRONTEND_INDICATORS: &[&str] = &["package.json", "yarn.lock", "pnpm-lock.yaml"];

    pub const BACKEND_INDICATORS: &[&str] = &[
        "pom.xml",
        "build.gradle",
        "go.mod",
        "Cargo.toml",
        "requirements.txt",
        "Gemfile",
    ];

    pub const FRONTEND_PRIORITY_FILES: &[&str] = &[
        "package.json",
        "README.md",
        "index.html",
        "App.tsx",
        "App.jsx",
        "main.tsx",
        "main.jsx",
        "vite.config.ts",
        "tailwind.config.ts",
        "tsconfig.json",
        "webpack.config.js",
        "next.config.js",
        "nuxt.config.js",
    ];

    pub const BACKEND_PRIORITY_FILES: &[&str] = &[
        "pom.xml",
        "build.gradle",
        "settings.gradle",
        "application.properties",
        "application.yml",
        "setup.py",
        "requirements.txt",
        "go.mod",
        "Cargo.toml",
        "composer.json",
        "Program.cs",
        "Startup.cs",
        "README.md",
        "Gemfile",
    ];
}

/// Prompt assembly constants
pub mod prompt {
    /// Characters of each source file embedded in refinement prompts
    pub const FILE_SUMMARY_CHARS: usize = 2000;

    /// Answer the critic is told to give when nothing needs changing
    pub const APPROVAL_SENTENCE: &str = "The documentation is excellent and requires no changes.";
}

/// Cross validator constants
pub mod validator {
    /// Maximum undocumented-element warnings per pass
    pub const MAX_UNDOCUMENTED_WARNINGS: usize = 5;

    /// Tokens this short are never treated as documented elements
    pub const MIN_TOKEN_LEN: usize = 3;

    /// Words that look like identifiers in prose but never name code
    pub const STOP_WORDS: &[&str] = &[
        "the", "and", "for", "with", "this", "that", "are", "will", "from", "code", "api", "int",
        "str", "bool", "dict", "float", "new", "or", "not", "try", "case", "when", "then",
    ];
}

/// Semantic scorer constants
pub mod scorer {
    /// Weight applied to negative matches
    pub const NEGATIVE_WEIGHT: f64 = 1.2;

    /// Matches per aspect for full match confidence
    pub const MATCHES_FOR_FULL_CONFIDENCE: f64 = 2.0;

    /// Critique words for full length confidence
    pub const WORDS_FOR_FULL_CONFIDENCE: f64 = 50.0;

    /// Lower-case phrases that accept a draft outright
    pub const APPROVAL_PHRASES: &[&str] = &[
        "documentation is excellent",
        "requires no changes",
        "no changes needed",
        "no changes are needed",
        "satisfactory as is",
        "no further changes",
        "documentation is perfect",
    ];
}

/// Score combiner penalties
pub mod combiner {
    pub const ERROR_PENALTY: f64 = 0.2;

    pub const WARNING_PENALTY: f64 = 0.1;
}

/// Dependency graph and architecture detection constants
pub mod architecture {
    pub const MVC_CONFIDENCE: f64 = 0.7;

    pub const SERVICE_LAYER_CONFIDENCE: f64 = 0.8;

    pub const REPOSITORY_CONFIDENCE: f64 = 0.9;

    /// Service-named elements needed before a service layer is reported
    pub const MIN_SERVICE_ELEMENTS: usize = 2;

    /// Patterns must be strictly more confident than this before the
    /// document is expected to mention them
    pub const MENTION_CONFIDENCE: f64 = 0.7;

    /// Centrality credit per import resolved to an element
    pub const DEPENDENCY_WEIGHT: f64 = 1.0;

    /// Centrality credit per file the element's file depends on
    pub const RELATED_FILE_WEIGHT: f64 = 0.5;

    pub const DEFAULT_CENTRAL_ELEMENTS: usize = 5;
}
