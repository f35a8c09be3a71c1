//! Configuration Management
//!
//! Hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/docloop/config.toml)
//! 3. Project config (.docloop.toml)
//! 4. Environment variables (flat names, then DOCLOOP_*)
//! 5. CLI arguments (highest priority, applied by the caller)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
