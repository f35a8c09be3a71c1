//! Generate Command
//!
//! Runs the full draft → critique → refine cycle for a directory and
//! writes the accepted (or last) document plus its run report.

use std::path::PathBuf;

use crate::analyzer::ProjectType;
use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::OutputFormat;
use crate::critique::ScoreCombiner;
use crate::cycle::{CycleController, DocumentationAgent, OutputWriter, ProjectSource};
use crate::types::Result;

/// Command-line overrides for one run; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub dir: PathBuf,
    pub model: Option<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub max_files: Option<usize>,
    pub iterations: Option<u32>,
    pub project_type: Option<ProjectType>,
    pub no_cache: bool,
}

pub async fn run(ctx: &CommandContext, options: GenerateOptions) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(model) = options.model {
        config.llm.model = model;
    }
    if let Some(format) = options.format {
        config.generation.format = format;
    }
    if let Some(output) = options.output {
        config.generation.output = Some(output);
    }
    if let Some(max_files) = options.max_files {
        config.generation.max_files = max_files;
    }
    if let Some(iterations) = options.iterations {
        config.generation.max_iterations = iterations;
    }
    config.validate()?;

    let ctx = CommandContext {
        config,
        quiet: ctx.quiet,
    };
    let config = &ctx.config;
    let output = Output::quiet(ctx.quiet);
    let output_path = config.generation.output_path();

    output.header("docloop generate");
    output.field("directory", options.dir.display());
    output.field("model", &config.llm.model);
    output.field("format", config.generation.format.as_str());
    output.field("output", output_path.display());

    let source = ProjectSource::Directory {
        root: options.dir,
        max_files: config.generation.max_files,
        project_type: options.project_type,
        read_concurrency: config.generation.read_concurrency,
    };
    let controller = CycleController::new(
        source,
        ctx.gateway(options.no_cache)?,
        config.llm.model.clone(),
        ScoreCombiner::new(config.agent.critique_threshold)?,
    )?
    .with_format(config.generation.format)
    .with_writer(OutputWriter::new(output_path));

    let outcome = controller.run(config.generation.max_iterations).await?;
    let persisted = controller.persist(&outcome).await?;

    output.section("Result");
    if outcome.status.is_accepted() {
        output.success(&outcome.status.to_string());
    } else {
        output.warning(&outcome.status.to_string());
    }
    output.field("document", persisted.document.display());
    output.field("report", persisted.report.display());
    output.field("final length", format!("{} chars", outcome.documentation.chars().count()));
    output.field("refinements", outcome.metrics.len());
    for metric in &outcome.metrics {
        output.field(
            &format!("  iteration {}", metric.iteration),
            format!("{:.1}s, {} chars", metric.elapsed_secs, metric.draft_length),
        );
    }

    let stats = controller.gateway().stats();
    output.field(
        "generator calls",
        format!(
            "{} ({} cached, {} retries)",
            stats.calls, stats.cache_hits, stats.retries
        ),
    );
    Ok(())
}
