use serde::{Deserialize, Serialize};

/// The five independently scored quality dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    TechnicalAccuracy,
    Completeness,
    Clarity,
    Structure,
    Usefulness,
}

impl Aspect {
    pub const ALL: [Aspect; 5] = [
        Aspect::TechnicalAccuracy,
        Aspect::Completeness,
        Aspect::Clarity,
        Aspect::Structure,
        Aspect::Usefulness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TechnicalAccuracy => "technical_accuracy",
            Self::Completeness => "completeness",
            Self::Clarity => "clarity",
            Self::Structure => "structure",
            Self::Usefulness => "usefulness",
        }
    }
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multi-dimensional quality score derived from a critique.
///
/// All six values lie in `[0, 1]` and `overall_score` is always the mean of
/// the five aspect scores. Construct through [`SemanticScore::new`] to keep
/// both invariants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticScore {
    pub technical_accuracy: f64,
    pub completeness: f64,
    pub clarity: f64,
    pub structure: f64,
    pub usefulness: f64,
    pub confidence: f64,
    pub overall_score: f64,
}

impl SemanticScore {
    /// Build a score from per-aspect values (in [`Aspect::ALL`] order).
    /// Values are clamped; non-finite values become 0.
    pub fn new(aspects: [f64; 5], confidence: f64) -> Self {
        let [technical_accuracy, completeness, clarity, structure, usefulness] =
            aspects.map(unit_clamp);
        let overall_score =
            (technical_accuracy + completeness + clarity + structure + usefulness) / 5.0;
        Self {
            technical_accuracy,
            completeness,
            clarity,
            structure,
            usefulness,
            confidence: unit_clamp(confidence),
            overall_score,
        }
    }

    pub fn aspect(&self, aspect: Aspect) -> f64 {
        match aspect {
            Aspect::TechnicalAccuracy => self.technical_accuracy,
            Aspect::Completeness => self.completeness,
            Aspect::Clarity => self.clarity,
            Aspect::Structure => self.structure,
            Aspect::Usefulness => self.usefulness,
        }
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0
pub fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
