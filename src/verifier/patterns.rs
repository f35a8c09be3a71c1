//! Documented-Element Extraction
//!
//! Finds the identifiers a document claims exist: method headers, call
//! shapes, `class X` mentions and backtick code references.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use crate::constants::validator::{MIN_TOKEN_LEN, STOP_WORDS};
use crate::types::{DocError, Result};

const TOKEN_PATTERNS: &[&str] = &[
    r"###\s+(\w+)\s*\(",
    r"(\w+)\s*\(.*\)",
    r"class\s+(\w+)",
    r"`(\w+)`",
    r"`(\w+)\(",
];

/// Compiled token patterns, matched case-insensitively
#[derive(Debug, Clone)]
pub struct DocPatterns {
    patterns: Vec<Regex>,
}

impl DocPatterns {
    pub fn new() -> Result<Self> {
        let patterns = TOKEN_PATTERNS
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        DocError::Config(format!("Invalid token pattern '{}': {}", pattern, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Every identifier token the document mentions, minus stop words and
    /// tokens shorter than three characters.
    pub fn documented_elements(&self, text: &str) -> BTreeSet<String> {
        self.patterns
            .iter()
            .flat_map(|pattern| pattern.captures_iter(text))
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|token| is_candidate(token))
            .map(str::to_string)
            .collect()
    }
}

fn is_candidate(token: &str) -> bool {
    token.chars().count() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(&token.to_lowercase().as_str())
}
