use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    NamingInconsistency,
    MissingElement,
    UndocumentedElement,
    ClaimMismatch,
    ArchitectureAwareness,
    CrossFileReference,
    AmbiguousReference,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NamingInconsistency => "naming_inconsistency",
            Self::MissingElement => "missing_element",
            Self::UndocumentedElement => "undocumented_element",
            Self::ClaimMismatch => "claim_mismatch",
            Self::ArchitectureAwareness => "architecture_awareness",
            Self::CrossFileReference => "cross_file_reference",
            Self::AmbiguousReference => "ambiguous_reference",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding from cross-validating documentation against code.
///
/// Findings are advisory data, never errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub issue_type: IssueType,
    pub description: String,
    pub suggested_fix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ValidationIssue {
    pub fn warning(
        issue_type: IssueType,
        description: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            issue_type,
            description: description.into(),
            suggested_fix: suggested_fix.into(),
            location: None,
        }
    }

    pub fn error(
        issue_type: IssueType,
        description: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            severity: IssueSeverity::Error,
            issue_type,
            description: description.into(),
            suggested_fix: suggested_fix.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

/// Error and warning totals over one validation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub errors: usize,
    pub warnings: usize,
}

impl IssueCounts {
    pub fn tally(issues: &[ValidationIssue]) -> Self {
        issues.iter().fold(Self::default(), |mut acc, issue| {
            match issue.severity {
                IssueSeverity::Error => acc.errors += 1,
                IssueSeverity::Warning => acc.warnings += 1,
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally() {
        let issues = vec![
            ValidationIssue::error(IssueType::MissingElement, "a", "b"),
            ValidationIssue::warning(IssueType::UndocumentedElement, "c", "d"),
            ValidationIssue::warning(IssueType::NamingInconsistency, "e", "f").at("x.py"),
        ];
        let counts = IssueCounts::tally(&issues);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.warnings, 2);
    }

    #[test]
    fn test_issue_type_tags() {
        assert_eq!(IssueType::MissingElement.to_string(), "missing_element");
        let json = serde_json::to_string(&IssueType::NamingInconsistency).unwrap();
        assert_eq!(json, "\"naming_inconsistency\"");
    }
}
