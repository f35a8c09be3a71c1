//! Semantic Scorer
//!
//! Turns free-text critique into a [`SemanticScore`].
//!
//! ## Scoring
//!
//! For each aspect, count positive matches `P` and negative matches `N`
//! over the lower-cased critique (a pattern may match several times):
//!
//! - `P = N = 0` scores a neutral 0.5
//! - otherwise `((P - 1.2 N) / (P + N) + 1) / 2`, clamped to `[0, 1]`
//!
//! Aspect confidence averages `min(1, (P + N) / 2)` with
//! `min(1, words / 50)`; the overall confidence is the mean across aspects.
//!
//! A critique containing one of the approval phrases skips scoring
//! entirely and is reported as [`Assessment::ExplicitApproval`].

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::constants::scorer::{
    APPROVAL_PHRASES, MATCHES_FOR_FULL_CONFIDENCE, NEGATIVE_WEIGHT, WORDS_FOR_FULL_CONFIDENCE,
};
use crate::types::{Aspect, DocError, Result, SemanticScore, unit_clamp};

// =============================================================================
// Pattern Tables
// =============================================================================

fn positive_patterns(aspect: Aspect) -> &'static [&'static str] {
    match aspect {
        Aspect::TechnicalAccuracy => &[
            r"(sophisticated|enterprise.*architecture|design.*patterns)",
            r"(well.*implemented|properly.*structured|sound.*engineering)",
            r"(separation.*of.*concerns|dependency.*injection|solid.*principles)",
            r"(comprehensive|thorough|complete|maintainable|robust)",
            r"(proper.*abstraction|architectural.*integrity|loose.*coupling)",
        ],
        Aspect::Completeness => &[
            r"(covers.*all.*aspects|comprehensive)",
            r"(includes.*everything|complete.*coverage)",
            r"(addresses.*all.*requirements|fully.*documented)",
            r"(all.*necessary.*information|sufficient.*detail)",
        ],
        Aspect::Clarity => &[
            r"(clear|easy.*to.*understand|well.*written)",
            r"(concise|to.*the.*point|well.*organized|logical)",
            r"(readable|accessible|user.*friendly|intuitive)",
        ],
        Aspect::Structure => &[
            r"(well.*structured|good.*organization|proper.*formatting)",
            r"(logical.*flow|nice.*layout|professional.*presentation)",
            r"(maintains.*separation|clear.*boundaries)",
            r"(architectural.*integrity|maintainable|robust)",
        ],
        Aspect::Usefulness => &[
            r"(helpful|useful|practical|actionable)",
            r"(provides.*guidance|real.*value)",
            r"(solves.*problems|addresses.*needs|developers.*will.*benefit)",
        ],
    }
}

fn negative_patterns(aspect: Aspect) -> &'static [&'static str] {
    match aspect {
        Aspect::TechnicalAccuracy => &[
            r"(inaccurate|incorrect|wrong|error)",
            r"(misleading|confusing|unclear)",
            r"(poor.*implementation|bad.*architecture|lacks.*robustness)",
            r"(tight.*coupling|high.*complexity|unmaintainable)",
        ],
        Aspect::Completeness => &[
            r"(incomplete|missing|omitted)",
            r"(lacks.*coverage|insufficient|too.*brief)",
            r"(needs.*more.*detail|missing.*aspects)",
        ],
        Aspect::Clarity => &[
            r"(unclear|confusing|hard.*to.*understand)",
            r"(poor.*writing|bad.*presentation)",
            r"(too.*complex|unnecessarily.*complicated|poorly.*organized)",
        ],
        Aspect::Structure => &[
            r"(poor.*structure|bad.*organization)",
            r"(lacks.*logic|confusing.*flow)",
            r"(poor.*formatting|bad.*layout|inconsistent)",
        ],
        Aspect::Usefulness => &[
            r"(unhelpful|useless|not.*useful)",
            r"(theoretical.*only|impractical)",
            r"(doesn.*t.*help|fails.*to.*address.*needs|developers.*won.*t.*benefit)",
        ],
    }
}

// =============================================================================
// Assessment
// =============================================================================

/// Outcome of reading one critique
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assessment {
    /// The critique contained an approval phrase; no scoring happened
    ExplicitApproval { phrase: String },
    Scored(SemanticScore),
}

impl Assessment {
    pub fn score(&self) -> Option<&SemanticScore> {
        match self {
            Self::ExplicitApproval { .. } => None,
            Self::Scored(score) => Some(score),
        }
    }

    pub fn is_explicit_approval(&self) -> bool {
        matches!(self, Self::ExplicitApproval { .. })
    }
}

/// Match counts for one aspect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AspectMatches {
    pub positive: usize,
    pub negative: usize,
}

impl AspectMatches {
    pub fn score(&self) -> f64 {
        let (p, n) = (self.positive as f64, self.negative as f64);
        if self.positive == 0 && self.negative == 0 {
            return 0.5;
        }
        let net = p - n * NEGATIVE_WEIGHT;
        unit_clamp((net / (p + n) + 1.0) / 2.0)
    }

    pub fn confidence(&self, word_count: usize) -> f64 {
        let total = (self.positive + self.negative) as f64;
        let match_confidence = (total / MATCHES_FOR_FULL_CONFIDENCE).min(1.0);
        let length_confidence = (word_count as f64 / WORDS_FOR_FULL_CONFIDENCE).min(1.0);
        (match_confidence + length_confidence) / 2.0
    }
}

struct AspectPatterns {
    positive: Vec<Regex>,
    negative: Vec<Regex>,
}

impl AspectPatterns {
    fn count(patterns: &[Regex], text: &str) -> usize {
        patterns.iter().map(|p| p.find_iter(text).count()).sum()
    }

    fn matches(&self, text: &str) -> AspectMatches {
        AspectMatches {
            positive: Self::count(&self.positive, text),
            negative: Self::count(&self.negative, text),
        }
    }
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| DocError::Config(format!("Invalid scorer pattern '{}': {}", pattern, e)))
        })
        .collect()
}

/// Aspect-pattern critique scorer. Patterns are compiled once per scorer.
pub struct SemanticScorer {
    aspects: Vec<(Aspect, AspectPatterns)>,
}

impl SemanticScorer {
    pub fn new() -> Result<Self> {
        let aspects = Aspect::ALL
            .iter()
            .map(|&aspect| {
                Ok((
                    aspect,
                    AspectPatterns {
                        positive: compile_all(positive_patterns(aspect))?,
                        negative: compile_all(negative_patterns(aspect))?,
                    },
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { aspects })
    }

    /// Approval phrase check, then aspect scoring
    pub fn assess(&self, critique: &str) -> Assessment {
        let lowered = critique.to_lowercase();
        if let Some(phrase) = APPROVAL_PHRASES.iter().find(|p| lowered.contains(*p)) {
            debug!("Critique contains approval phrase '{}'", phrase);
            return Assessment::ExplicitApproval {
                phrase: (*phrase).to_string(),
            };
        }
        Assessment::Scored(self.score(critique))
    }

    /// Aspect scoring only; approval phrases are not considered
    pub fn score(&self, critique: &str) -> SemanticScore {
        let text = critique.trim().to_lowercase();
        let word_count = critique.split_whitespace().count();

        let mut scores = [0.0; 5];
        let mut confidence_sum = 0.0;
        for (i, (aspect, patterns)) in self.aspects.iter().enumerate() {
            let matches = patterns.matches(&text);
            scores[i] = matches.score();
            confidence_sum += matches.confidence(word_count);
            debug!(
                aspect = aspect.as_str(),
                positive = matches.positive,
                negative = matches.negative,
                score = scores[i],
                "Aspect scored"
            );
        }

        SemanticScore::new(scores, confidence_sum / self.aspects.len() as f64)
    }

    /// Per-aspect match counts, for reporting
    pub fn matches(&self, critique: &str) -> Vec<(Aspect, AspectMatches)> {
        let text = critique.trim().to_lowercase();
        self.aspects
            .iter()
            .map(|(aspect, patterns)| (*aspect, patterns.matches(&text)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scorer() -> SemanticScorer {
        SemanticScorer::new().unwrap()
    }

    #[test]
    fn test_no_matches_is_neutral() {
        let score = scorer().score("Lorem ipsum dolor sit amet.");
        assert_eq!(score.overall_score, 0.5);
        for aspect in Aspect::ALL {
            assert_eq!(score.aspect(aspect), 0.5);
        }
        // zero matches, five words
        assert!((score.confidence - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_approval_short_circuits() {
        let assessment = scorer().assess("The Documentation Is Excellent and requires no changes.");
        assert!(assessment.is_explicit_approval());
        assert!(assessment.score().is_none());
    }

    #[test]
    fn test_aspect_formula() {
        let one_each = AspectMatches { positive: 1, negative: 1 };
        assert!((one_each.score() - 0.45).abs() < 1e-12);

        let only_negative = AspectMatches { positive: 0, negative: 3 };
        assert_eq!(only_negative.score(), 0.0);

        let only_positive = AspectMatches { positive: 2, negative: 0 };
        assert_eq!(only_positive.score(), 1.0);
    }

    #[test]
    fn test_negative_critique_scores_low() {
        let score = scorer().score(
            "The section is incomplete and missing details. It is confusing and unclear, \
             with poor structure and inconsistent formatting. Not useful.",
        );
        assert!(score.overall_score < 0.3, "got {}", score.overall_score);
    }

    #[test]
    fn test_positive_critique_scores_high() {
        let score = scorer().score(
            "A comprehensive, clear and well structured guide. Helpful and practical \
             with sufficient detail and a logical flow.",
        );
        assert!(score.overall_score > 0.7, "got {}", score.overall_score);
        assert!(score.confidence > 0.5);
    }

    #[test]
    fn test_repeated_matches_count() {
        let matches = scorer().matches("missing missing missing");
        let completeness = matches
            .iter()
            .find(|(a, _)| *a == Aspect::Completeness)
            .map(|(_, m)| *m)
            .unwrap();
        assert_eq!(completeness.negative, 3);
    }

    proptest! {
        #[test]
        fn prop_scores_bounded(critique in ".{0,200}") {
            let s = SemanticScorer::new().unwrap().score(&critique);
            for aspect in Aspect::ALL {
                prop_assert!((0.0..=1.0).contains(&s.aspect(aspect)));
            }
            prop_assert!((0.0..=1.0).contains(&s.confidence));
            let mean = Aspect::ALL.iter().map(|a| s.aspect(*a)).sum::<f64>() / 5.0;
            prop_assert!((s.overall_score - mean).abs() < 1e-12);
        }
    }
}
