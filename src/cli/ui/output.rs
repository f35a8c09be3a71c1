use console::style;

use crate::types::{Aspect, SemanticScore};

/// Styled terminal output for command results.
///
/// Quiet mode suppresses everything except errors.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        if !self.quiet {
            println!("  {:<22} {}", style(label).dim(), value);
        }
    }

    /// One line per aspect with a ten-cell bar
    pub fn scores(&self, score: &SemanticScore) {
        if self.quiet {
            return;
        }
        for aspect in Aspect::ALL {
            let value = score.aspect(aspect);
            let filled = (value * 10.0).round() as usize;
            println!(
                "  {:<22} {}{} {:.2}",
                aspect.as_str(),
                style("█".repeat(filled)).cyan(),
                style("░".repeat(10 - filled.min(10))).dim(),
                value
            );
        }
        self.field("overall", format!("{:.2}", score.overall_score));
        self.field("confidence", format!("{:.2}", score.confidence));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
