//! Documentation Cycle
//!
//! The top-level state machine that turns a code snapshot into accepted
//! documentation.

pub mod controller;
pub mod output;
pub mod state;

pub use controller::{
    Analysis, CycleController, DocumentationAgent, ProjectSource, RunOutcome, RunStatus,
};
pub use output::{OutputWriter, PersistedOutput, RunReport};
pub use state::{CycleState, Phase};
