//! Cache Command
//!
//! Usage:
//!   docloop cache stats
//!   docloop cache clear
//!   docloop cache prune

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::types::Result;

pub async fn stats(ctx: &CommandContext) -> Result<()> {
    let stats = ctx.cache().stats().await?;
    let output = Output::quiet(ctx.quiet);
    let stamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    output.header("Response Cache");
    output.field("directory", ctx.cache_dir().display());
    output.field("entries", stats.entry_count);
    output.field("size", format!("{} bytes", stats.total_size_bytes));
    output.field("oldest", stamp(stats.oldest_entry));
    output.field("newest", stamp(stats.newest_entry));
    output.field("max entries", ctx.config.agent.cache_max_entries);
    output.field("max age", format!("{}h", ctx.config.agent.cache_max_age_hours));
    Ok(())
}

pub async fn clear(ctx: &CommandContext) -> Result<()> {
    let removed = ctx.cache().clear().await?;
    Output::quiet(ctx.quiet).success(&format!("Removed {} cached response(s)", removed));
    Ok(())
}

pub async fn prune(ctx: &CommandContext) -> Result<()> {
    let report = ctx.cache().prune().await?;
    let output = Output::quiet(ctx.quiet);
    output.success(&format!("Pruned {} cached response(s)", report.total()));
    output.field("expired", report.expired);
    output.field("over capacity", report.evicted);
    Ok(())
}
