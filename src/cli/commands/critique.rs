//! Critique Command
//!
//! Scores a critique text offline, without calling the generator.

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::critique::{Assessment, ScoreCombiner, SemanticScorer};
use crate::types::Result;

pub fn run(ctx: &CommandContext, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)?;
    let scorer = SemanticScorer::new()?;
    let combiner = ScoreCombiner::new(ctx.config.agent.critique_threshold)?;
    let output = Output::quiet(ctx.quiet);

    let assessment = scorer.assess(&text);
    let decision = combiner.decide(&assessment, &[]);

    output.header(&format!("Critique: {}", file.display()));
    match &assessment {
        Assessment::ExplicitApproval { phrase } => {
            output.info(&format!("Explicit approval (\"{}\")", phrase));
        }
        Assessment::Scored(score) => {
            output.section("Aspect scores");
            output.scores(score);
        }
    }

    output.section("Decision");
    output.field("final score", format!("{:.2}", decision.final_score));
    output.field("threshold", format!("{:.2}", combiner.threshold()));
    output.field("reason", decision.reason);

    if decision.accepted {
        output.success("Accepted");
    } else {
        output.warning("Needs refinement");
    }
    Ok(())
}
