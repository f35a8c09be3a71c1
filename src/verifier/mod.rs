//! Cross Validation
//!
//! Checks generated documentation against the code it describes.

pub mod claims;
pub mod patterns;
pub mod reporter;
pub mod validator;

pub use claims::{
    AmbiguousReferenceRule, ArchitectureRule, ClaimRule, CrossFileReferenceRule, PatternClaimRule,
    default_rules,
};
pub use patterns::DocPatterns;
pub use reporter::{Reporter, ValidationReport};
pub use validator::CrossValidator;
