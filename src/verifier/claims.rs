//! Claim Rules
//!
//! Each rule recognizes one kind of claim in prose and may check it
//! against the index.
//!
//! - Return, parameter and dependency phrasing is recognized but never
//!   reported
//! - Architecture patterns the code shows must be named by the document
//! - "A uses B" style relations must match the import graph
//! - A documented name defined in several files is ambiguous

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::patterns::DocPatterns;
use crate::analyzer::{ArchitectureKind, CodeElementIndex};
use crate::constants::architecture::MENTION_CONFIDENCE;
use crate::types::{DocError, IssueType, Result, ValidationIssue};

pub trait ClaimRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Claim subjects found in `documentation`
    fn claims(&self, documentation: &str) -> Vec<String>;

    /// Issues for claims that contradict the code
    fn check(&self, documentation: &str, index: &CodeElementIndex) -> Vec<ValidationIssue>;
}

/// A rule driven by a single case-insensitive pattern whose first group is
/// the claim subject.
pub struct PatternClaimRule {
    name: &'static str,
    pattern: Regex,
}

fn claim_pattern(name: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| DocError::Config(format!("Invalid claim pattern for {}: {}", name, e)))
}

impl PatternClaimRule {
    fn new(name: &'static str, pattern: &str) -> Result<Self> {
        Ok(Self {
            name,
            pattern: claim_pattern(name, pattern)?,
        })
    }

    /// "returns X"
    pub fn returns() -> Result<Self> {
        Self::new("return", r"returns\s+(\w+)")
    }

    /// "accepts a, b"
    pub fn parameters() -> Result<Self> {
        Self::new("parameter", r"accepts?\s+(\w+(?:,\s*\w+)*)")
    }

    /// "uses X"
    pub fn dependencies() -> Result<Self> {
        Self::new("dependency", r"uses?\s+(\w+)")
    }
}

impl ClaimRule for PatternClaimRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn claims(&self, documentation: &str) -> Vec<String> {
        self.pattern
            .captures_iter(documentation)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn check(&self, documentation: &str, _index: &CodeElementIndex) -> Vec<ValidationIssue> {
        let claims = self.claims(documentation);
        debug!(rule = self.name, count = claims.len(), "Recognized claims");
        Vec::new()
    }
}

/// Warns when the code shows a confident architecture pattern the document
/// never names
pub struct ArchitectureRule;

impl ClaimRule for ArchitectureRule {
    fn name(&self) -> &'static str {
        "architecture"
    }

    fn claims(&self, documentation: &str) -> Vec<String> {
        let lower = documentation.to_lowercase();
        [
            ArchitectureKind::ModelViewController,
            ArchitectureKind::ServiceLayer,
            ArchitectureKind::Repository,
        ]
        .into_iter()
        .filter(|kind| kind.mentions().iter().any(|m| lower.contains(m)))
        .map(|kind| kind.label().to_string())
        .collect()
    }

    fn check(&self, documentation: &str, index: &CodeElementIndex) -> Vec<ValidationIssue> {
        let lower = documentation.to_lowercase();
        index
            .architecture_patterns()
            .into_iter()
            .filter(|p| p.confidence > MENTION_CONFIDENCE)
            .filter(|p| !p.kind.mentions().iter().any(|m| lower.contains(m)))
            .map(|p| {
                ValidationIssue::warning(
                    IssueType::ArchitectureAwareness,
                    format!(
                        "Codebase uses {} pattern but documentation doesn't mention it",
                        p.kind
                    ),
                    format!(
                        "Consider documenting the {} architecture used in this project",
                        p.kind
                    ),
                )
                .at(p.files.into_iter().collect::<Vec<_>>().join(", "))
            })
            .collect()
    }
}

/// Checks "A imports/uses/calls/extends/implements B" against the import
/// graph. Relations where neither side names an indexed element or file are
/// treated as plain prose.
pub struct CrossFileReferenceRule {
    pattern: Regex,
}

impl CrossFileReferenceRule {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: claim_pattern(
                "cross_file_reference",
                r"(\w+)\s+(?:imports|uses|calls|extends|implements)\s+(\w+)",
            )?,
        })
    }

    /// Distinct (source, target) pairs in order of appearance
    fn relations<'d>(&self, documentation: &'d str) -> Vec<(&'d str, &'d str)> {
        let mut seen = BTreeSet::new();
        self.pattern
            .captures_iter(documentation)
            .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
            .filter(|pair| seen.insert(*pair))
            .collect()
    }
}

/// Graph files whose path contains `word` or that define an element named
/// `word`, ignoring case
fn files_named_by<'i>(index: &'i CodeElementIndex, word: &str) -> BTreeSet<&'i str> {
    let lower = word.to_lowercase();
    let relationships = index.dependency_graph().relationships();
    relationships
        .iter()
        .flat_map(|(source, targets)| std::iter::once(source).chain(targets))
        .map(String::as_str)
        .filter(|file| file.to_lowercase().contains(&lower))
        .chain(
            index
                .definitions_ignoring_case(word)
                .into_iter()
                .map(|e| e.file.as_str()),
        )
        .collect()
}

fn names_code(index: &CodeElementIndex, word: &str) -> bool {
    index.find_case_insensitive(word).is_some() || !files_named_by(index, word).is_empty()
}

impl ClaimRule for CrossFileReferenceRule {
    fn name(&self) -> &'static str {
        "cross_file_reference"
    }

    fn claims(&self, documentation: &str) -> Vec<String> {
        self.relations(documentation)
            .into_iter()
            .map(|(source, target)| format!("{} -> {}", source, target))
            .collect()
    }

    fn check(&self, documentation: &str, index: &CodeElementIndex) -> Vec<ValidationIssue> {
        let relationships = index.dependency_graph().relationships();

        self.relations(documentation)
            .into_iter()
            .filter(|(source, target)| names_code(index, source) || names_code(index, target))
            .filter(|(source, target)| {
                let sources = files_named_by(index, source);
                let targets = files_named_by(index, target);
                !relationships
                    .iter()
                    .filter(|(file, _)| sources.is_empty() || sources.contains(file.as_str()))
                    .flat_map(|(_, imported)| imported)
                    .any(|file| targets.contains(file.as_str()))
            })
            .map(|(source, target)| {
                ValidationIssue::warning(
                    IssueType::CrossFileReference,
                    format!(
                        "Documentation mentions relationship between '{}' and '{}' but analysis shows no such dependency",
                        source, target
                    ),
                    "Verify the cross-file relationship or update documentation to reflect actual code structure",
                )
                .at("documentation")
            })
            .collect()
    }
}

/// Warns when a documented name is defined in more than one file
pub struct AmbiguousReferenceRule {
    patterns: DocPatterns,
}

impl AmbiguousReferenceRule {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: DocPatterns::new()?,
        })
    }
}

impl ClaimRule for AmbiguousReferenceRule {
    fn name(&self) -> &'static str {
        "ambiguous_reference"
    }

    fn claims(&self, documentation: &str) -> Vec<String> {
        self.patterns
            .documented_elements(documentation)
            .into_iter()
            .collect()
    }

    fn check(&self, documentation: &str, index: &CodeElementIndex) -> Vec<ValidationIssue> {
        self.claims(documentation)
            .into_iter()
            .filter_map(|token| {
                let definitions = index.definitions_ignoring_case(&token);
                (definitions.len() > 1).then(|| {
                    let files: Vec<&str> = definitions.iter().map(|e| e.file.as_str()).collect();
                    ValidationIssue::warning(
                        IssueType::AmbiguousReference,
                        format!("Documentation reference '{}' could refer to multiple elements", token),
                        format!(
                            "Be more specific about which {} you mean (defined in {})",
                            token,
                            files.join(", ")
                        ),
                    )
                    .at("documentation")
                })
            })
            .collect()
    }
}

/// Claim recognizers followed by the architecture, cross-file and ambiguity
/// checks
pub fn default_rules() -> Result<Vec<Box<dyn ClaimRule>>> {
    Ok(vec![
        Box::new(PatternClaimRule::returns()?),
        Box::new(PatternClaimRule::parameters()?),
        Box::new(PatternClaimRule::dependencies()?),
        Box::new(ArchitectureRule),
        Box::new(CrossFileReferenceRule::new()?),
        Box::new(AmbiguousReferenceRule::new()?),
    ])
}
