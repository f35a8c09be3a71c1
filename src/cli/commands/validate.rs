//! Validate Command
//!
//! Cross-validates an existing document against the code under a directory.

use std::path::{Path, PathBuf};

use crate::analyzer::{
    CodeElementIndex, ExtractorRegistry, FileScanner, detect_project_type, read_sources,
};
use crate::cli::util::CommandContext;
use crate::constants::architecture::DEFAULT_CENTRAL_ELEMENTS;
use crate::types::{DocError, Result};
use crate::verifier::{CrossValidator, Reporter, ValidationReport};

pub async fn run(
    ctx: &CommandContext,
    document: &Path,
    dir: &Path,
    max_files: Option<usize>,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let text = tokio::fs::read_to_string(document).await?;
    let project_type = detect_project_type(dir);
    let max_files = max_files.unwrap_or(ctx.config.generation.max_files);

    if !ctx.quiet {
        println!("Validating {}...", document.display());
        println!("  Root: {} ({})", dir.display(), project_type);
    }

    let paths = FileScanner::new(dir)
        .with_project_type(project_type)
        .with_max_files(max_files)
        .scan()?;
    let files = read_sources(dir, paths, ctx.config.generation.read_concurrency).await;

    let registry = ExtractorRegistry::with_defaults()?;
    let index = CodeElementIndex::build(&registry, &files);
    if !ctx.quiet {
        print_structure(&index);
    }
    let issues = CrossValidator::new()?.validate(&index, &text);

    let report = ValidationReport::new(document.display().to_string(), index.len(), issues);
    if !ctx.quiet {
        Reporter::print_summary(&report);
    }

    if let Some(output_path) = report_path {
        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Reporter::generate_json(&report, &output_path)?;
        if !ctx.quiet {
            println!();
            println!("Report saved to: {}", output_path.display());
        }
    }

    if report.has_errors() {
        return Err(DocError::Verification(format!(
            "{} error(s) in {}",
            report.counts.errors,
            document.display()
        )));
    }

    Ok(())
}

fn print_structure(index: &CodeElementIndex) {
    let graph = index.dependency_graph();
    println!("  Cross-file dependencies: {}", graph.edge_count());

    for pattern in index.architecture_patterns() {
        println!(
            "  Architecture: {} ({:.0}% confidence)",
            pattern.kind,
            pattern.confidence * 100.0
        );
    }

    let central = index.central_elements(DEFAULT_CENTRAL_ELEMENTS);
    if !central.is_empty() {
        let ranked: Vec<String> = central
            .iter()
            .map(|c| format!("{} ({:.1})", c.name, c.score))
            .collect();
        println!("  Central elements: {}", ranked.join(", "));
    }

    if let Some(top) = graph.coupling().first() {
        println!(
            "  Tightest coupling: {} -> {} ({:.2})",
            top.source, top.target, top.score
        );
    }
}
