//! Score Combiner
//!
//! `final = clamp((overall - 0.2 errors - 0.1 warnings) * confidence)`.
//! A draft is accepted when `final >= threshold` and there are no errors,
//! or when the critique was an explicit approval.

use serde::Serialize;

use super::scorer::Assessment;
use crate::constants::combiner::{ERROR_PENALTY, WARNING_PENALTY};
use crate::types::{DocError, IssueCounts, Result, SemanticScore, ValidationIssue, unit_clamp};

/// Why a decision came out the way it did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    ExplicitApproval,
    ScoreAccepted,
    BelowThreshold,
    ValidationErrors,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplicitApproval => "explicit approval",
            Self::ScoreAccepted => "score met threshold",
            Self::BelowThreshold => "score below threshold",
            Self::ValidationErrors => "validation errors present",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub accepted: bool,
    /// 1.0 for an explicit approval
    pub final_score: f64,
    pub semantic: Option<SemanticScore>,
    pub errors: usize,
    pub warnings: usize,
    pub reason: DecisionReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCombiner {
    threshold: f64,
}

impl ScoreCombiner {
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(DocError::Config(format!(
                "critique_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Penalized, confidence-weighted score in `[0, 1]`
    pub fn final_score(semantic: &SemanticScore, counts: IssueCounts) -> f64 {
        let penalized = semantic.overall_score
            - ERROR_PENALTY * counts.errors as f64
            - WARNING_PENALTY * counts.warnings as f64;
        unit_clamp(penalized * semantic.confidence)
    }

    pub fn decide(&self, assessment: &Assessment, issues: &[ValidationIssue]) -> Decision {
        let counts = IssueCounts::tally(issues);

        let semantic = match assessment {
            Assessment::ExplicitApproval { .. } => {
                return Decision {
                    accepted: true,
                    final_score: 1.0,
                    semantic: None,
                    errors: counts.errors,
                    warnings: counts.warnings,
                    reason: DecisionReason::ExplicitApproval,
                };
            }
            Assessment::Scored(score) => *score,
        };

        let final_score = Self::final_score(&semantic, counts);
        let reason = if counts.errors > 0 {
            DecisionReason::ValidationErrors
        } else if final_score >= self.threshold {
            DecisionReason::ScoreAccepted
        } else {
            DecisionReason::BelowThreshold
        };

        Decision {
            accepted: reason == DecisionReason::ScoreAccepted,
            final_score,
            semantic: Some(semantic),
            errors: counts.errors,
            warnings: counts.warnings,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueType;
    use proptest::prelude::*;

    /// Score whose overall and confidence are both `value`
    fn uniform(value: f64) -> SemanticScore {
        SemanticScore::new([value; 5], value)
    }

    fn error() -> ValidationIssue {
        ValidationIssue::error(IssueType::MissingElement, "missing", "remove")
    }

    fn warning() -> ValidationIssue {
        ValidationIssue::warning(IssueType::UndocumentedElement, "undocumented", "add")
    }

    #[test]
    fn test_one_error_is_rejected() {
        let combiner = ScoreCombiner::new(0.8).unwrap();
        let decision = combiner.decide(&Assessment::Scored(uniform(0.8)), &[error()]);
        assert!((decision.final_score - 0.48).abs() < 1e-9);
        assert!(!decision.accepted);
        assert_eq!(decision.reason, DecisionReason::ValidationErrors);
    }

    #[test]
    fn test_one_warning_penalty() {
        let score = ScoreCombiner::final_score(&uniform(0.8), IssueCounts { errors: 0, warnings: 1 });
        assert!((score - 0.56).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_boundary() {
        let combiner = ScoreCombiner::new(0.25).unwrap();
        let decision = combiner.decide(&Assessment::Scored(uniform(0.5)), &[]);
        assert_eq!(decision.final_score, 0.25);
        assert!(decision.accepted);

        let strict = ScoreCombiner::new(0.26).unwrap();
        let decision = strict.decide(&Assessment::Scored(uniform(0.5)), &[]);
        assert_eq!(decision.reason, DecisionReason::BelowThreshold);
    }

    #[test]
    fn test_explicit_approval_ignores_errors() {
        let combiner = ScoreCombiner::new(1.0).unwrap();
        let approval = Assessment::ExplicitApproval {
            phrase: "no changes needed".into(),
        };
        let decision = combiner.decide(&approval, &[error(), error(), warning()]);
        assert!(decision.accepted);
        assert_eq!(decision.errors, 2);
        assert_eq!(decision.reason, DecisionReason::ExplicitApproval);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(ScoreCombiner::new(1.5).is_err());
        assert!(ScoreCombiner::new(f64::NAN).is_err());
    }

    proptest! {
        #[test]
        fn prop_final_score_bounded(
            overall in 0.0f64..=1.0, confidence in 0.0f64..=1.0,
            errors in 0usize..10, warnings in 0usize..10,
        ) {
            let semantic = SemanticScore::new([overall; 5], confidence);
            let score = ScoreCombiner::final_score(&semantic, IssueCounts { errors, warnings });
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
