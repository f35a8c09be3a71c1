//! Critique Assessment
//!
//! Reads the generator's critique of a draft and, together with the cross
//! validation findings, decides whether the draft is done.

pub mod combiner;
pub mod scorer;

pub use combiner::{Decision, DecisionReason, ScoreCombiner};
pub use scorer::{AspectMatches, Assessment, SemanticScorer};
