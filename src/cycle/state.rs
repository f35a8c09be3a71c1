//! Cycle State
//!
//! Immutable record threaded through the documentation cycle. Every stage
//! takes a state by value and hands back the next one.
//!
//! ```text
//! Init → Drafted → Critiqued ─┬→ Accepted
//!                     ↑       └→ Refining ─┐
//!                     └────────────────────┘   (budget spent → Exhausted)
//! ```

use serde::Serialize;

use crate::critique::Decision;
use crate::types::{DocumentationDraft, IterationMetric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    Drafted,
    Critiqued,
    Refining,
    Accepted,
    Exhausted,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Drafted => "drafted",
            Self::Critiqued => "critiqued",
            Self::Refining => "refining",
            Self::Accepted => "accepted",
            Self::Exhausted => "exhausted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Exhausted)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleState {
    pub phase: Phase,
    pub draft: DocumentationDraft,
    /// Critique round in progress (1-indexed), 0 before the first critique
    pub iteration: u32,
    pub metrics: Vec<IterationMetric>,
    pub decisions: Vec<Decision>,
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Init,
            draft: DocumentationDraft::initial(""),
            iteration: 0,
            metrics: Vec::new(),
            decisions: Vec::new(),
        }
    }

    /// Initial draft received
    pub fn drafted(self, text: impl Into<String>) -> Self {
        Self {
            phase: Phase::Drafted,
            draft: DocumentationDraft::initial(text),
            ..self
        }
    }

    /// Critique for round `iteration` received
    pub fn critiqued(self, iteration: u32) -> Self {
        Self {
            phase: Phase::Critiqued,
            iteration,
            ..self
        }
    }

    /// Record the decision; acceptance ends the cycle, rejection moves to
    /// refinement
    pub fn decided(mut self, decision: Decision) -> Self {
        self.phase = if decision.accepted {
            Phase::Accepted
        } else {
            Phase::Refining
        };
        self.decisions.push(decision);
        self
    }

    /// Replace the draft with the refinement for the current round
    pub fn refined(mut self, text: impl Into<String>, metric: IterationMetric) -> Self {
        self.draft = self.draft.refined(text, self.iteration);
        self.metrics.push(metric);
        self.phase = Phase::Drafted;
        self
    }

    /// Iteration budget spent without acceptance
    pub fn exhausted(self) -> Self {
        Self {
            phase: Phase::Exhausted,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critique::DecisionReason;

    fn rejection() -> Decision {
        Decision {
            accepted: false,
            final_score: 0.1,
            semantic: None,
            errors: 1,
            warnings: 0,
            reason: DecisionReason::ValidationErrors,
        }
    }

    #[test]
    fn test_transitions() {
        let state = CycleState::new();
        assert_eq!(state.phase, Phase::Init);

        let state = state.drafted("# v0").critiqued(1);
        assert_eq!(state.phase, Phase::Critiqued);

        let state = state.decided(rejection());
        assert_eq!(state.phase, Phase::Refining);

        let state = state.refined(
            "# v1",
            IterationMetric::new(1, std::time::Duration::from_secs(1), 4),
        );
        assert_eq!(state.phase, Phase::Drafted);
        assert_eq!(state.draft.text, "# v1");
        assert_eq!(state.draft.iteration, 1);
        assert_eq!(state.metrics.len(), 1);
        assert_eq!(state.decisions.len(), 1);

        let state = state.exhausted();
        assert!(state.phase.is_terminal());
    }
}
