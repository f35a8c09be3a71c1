use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::types::{IssueCounts, IssueSeverity, Result, ValidationIssue};

/// Issues from one validation pass plus their totals
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub document: String,
    pub elements_indexed: usize,
    pub counts: IssueCounts,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(document: impl Into<String>, elements_indexed: usize, issues: Vec<ValidationIssue>) -> Self {
        Self {
            document: document.into(),
            elements_indexed,
            counts: IssueCounts::tally(&issues),
            issues,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.counts.errors > 0
    }
}

pub struct Reporter;

impl Reporter {
    pub fn generate_json<P: AsRef<Path>>(report: &ValidationReport, output_path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(output_path, json)?;
        Ok(())
    }

    pub fn print_summary(report: &ValidationReport) {
        println!("Validation Report: {}", report.document);
        println!("══════════════════════════════════════");
        println!();
        println!("Code elements indexed: {}", report.elements_indexed);
        println!("  Errors: {} ✗", report.counts.errors);
        println!("  Warnings: {} ⚠", report.counts.warnings);
        println!();

        if report.issues.is_empty() {
            println!("No issues found.");
        } else {
            println!("Issues ({}):", report.issues.len());
            println!();

            for issue in &report.issues {
                let icon = match issue.severity {
                    IssueSeverity::Error => "✗",
                    IssueSeverity::Warning => "⚠",
                };

                println!(
                    "{} [{}] {}: {}",
                    icon,
                    issue.severity,
                    issue.issue_type.as_str(),
                    issue.description
                );
                println!("  → {}", issue.suggested_fix);
                if let Some(ref location) = issue.location {
                    println!("  at {}", location);
                }
                println!();
            }
        }

        println!("══════════════════════════════════════");

        if report.has_errors() {
            println!("Result: FAILED ({} errors)", report.counts.errors);
        } else if report.counts.warnings > 0 {
            println!("Result: PASSED with warnings ({})", report.counts.warnings);
        } else {
            println!("Result: PASSED ✓");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueType;
    use tempfile::TempDir;

    #[test]
    fn test_report_counts_and_json() {
        let issues = vec![
            ValidationIssue::error(IssueType::MissingElement, "missing", "remove").at("documentation"),
            ValidationIssue::warning(IssueType::UndocumentedElement, "undocumented", "add"),
        ];
        let report = ValidationReport::new("docs.md", 4, issues);
        assert!(report.has_errors());
        assert_eq!(report.counts, IssueCounts { errors: 1, warnings: 1 });

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        Reporter::generate_json(&report, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["counts"]["errors"], 1);
        assert_eq!(value["issues"][0]["issue_type"], "missing_element");
        assert_eq!(value["issues"][1]["severity"], "warning");
    }
}
