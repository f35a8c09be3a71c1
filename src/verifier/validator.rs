//! Cross Validator
//!
//! Compares the identifiers a document mentions with the Code Element
//! Index. Checks run in a fixed order:
//!
//! 1. Every documented token must exist (exactly, or as a case mismatch)
//! 2. Public functions and types should be mentioned (first five reported)
//! 3. Claim rules
//!
//! Nothing is fetched or generated; the same index and document always
//! produce the same issues.

use tracing::{debug, instrument};

use super::claims::{ClaimRule, default_rules};
use super::patterns::DocPatterns;
use crate::analyzer::CodeElementIndex;
use crate::constants::validator::MAX_UNDOCUMENTED_WARNINGS;
use crate::types::{IssueType, Result, ValidationIssue};

pub struct CrossValidator {
    patterns: DocPatterns,
    rules: Vec<Box<dyn ClaimRule>>,
}

impl CrossValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: DocPatterns::new()?,
            rules: default_rules()?,
        })
    }

    pub fn with_rule(mut self, rule: Box<dyn ClaimRule>) -> Self {
        self.rules.push(rule);
        self
    }

    #[instrument(skip_all, fields(doc_len = documentation.len(), elements = index.len()))]
    pub fn validate(&self, index: &CodeElementIndex, documentation: &str) -> Vec<ValidationIssue> {
        let documented = self.patterns.documented_elements(documentation);
        debug!("Document mentions {} candidate elements", documented.len());

        let mut issues = Vec::new();

        for token in &documented {
            if index.contains_exact(token) {
                continue;
            }
            match index.find_case_insensitive(token) {
                Some(actual) => issues.push(
                    ValidationIssue::warning(
                        IssueType::NamingInconsistency,
                        format!(
                            "Documented element '{}' has case mismatch with actual code '{}'",
                            token, actual.name
                        ),
                        format!("Use consistent casing: '{}'", actual.name),
                    )
                    .at(actual.file.clone()),
                ),
                None => issues.push(
                    ValidationIssue::error(
                        IssueType::MissingElement,
                        format!(
                            "Documentation mentions '{}' but this element doesn't exist in the code",
                            token
                        ),
                        format!(
                            "Remove reference to '{}' or add the missing element to the code",
                            token
                        ),
                    )
                    .at("documentation"),
                ),
            }
        }

        issues.extend(
            index
                .public_elements()
                .filter(|element| !documented.contains(&element.name))
                .take(MAX_UNDOCUMENTED_WARNINGS)
                .map(|element| {
                    ValidationIssue::warning(
                        IssueType::UndocumentedElement,
                        format!(
                            "Code element '{}' is not mentioned in documentation",
                            element.name
                        ),
                        format!("Consider documenting {} '{}'", element.kind, element.name),
                    )
                    .at(element.file.clone())
                }),
        );

        for rule in &self.rules {
            issues.extend(rule.check(documentation, index));
        }

        issues
    }
}
