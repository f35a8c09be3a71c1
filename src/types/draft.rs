use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Candidate documentation text under evaluation.
///
/// Each refinement produces a new draft; the previous one is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationDraft {
    pub text: String,
    /// 0 for the initial draft, `i` for the draft produced by refinement `i`
    pub iteration: u32,
}

impl DocumentationDraft {
    pub fn initial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            iteration: 0,
        }
    }

    /// Replace this draft with the output of refinement `iteration`
    pub fn refined(self, text: impl Into<String>, iteration: u32) -> Self {
        Self {
            text: text.into(),
            iteration,
        }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One entry of the append-only refinement log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationMetric {
    pub iteration: u32,
    pub elapsed_secs: f64,
    pub draft_length: usize,
}

impl IterationMetric {
    pub fn new(iteration: u32, elapsed: Duration, draft_length: usize) -> Self {
        Self {
            iteration,
            elapsed_secs: elapsed.as_secs_f64(),
            draft_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refined_replaces_text_and_iteration() {
        let draft = DocumentationDraft::initial("# Draft");
        let next = draft.refined("# Better draft", 1);
        assert_eq!(next.iteration, 1);
        assert_eq!(next.len(), 14);
    }

    #[test]
    fn test_metric_records_seconds() {
        let metric = IterationMetric::new(2, Duration::from_millis(1500), 42);
        assert!((metric.elapsed_secs - 1.5).abs() < f64::EPSILON);
        assert_eq!(metric.draft_length, 42);
    }
}
