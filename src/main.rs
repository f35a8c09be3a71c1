use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docloop::analyzer::ProjectType;
use docloop::cli::CommandContext;
use docloop::cli::commands::{cache, config, critique, generate, validate};
use docloop::config::OutputFormat;

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

fn parse_project_type(s: &str) -> Result<ProjectType, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "docloop")]
#[command(
    version,
    about = "Self-refining documentation generator: draft, critique, validate, refine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Config file (skips the default search)")]
    config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documentation for a directory
    Generate {
        #[arg(short = 'd', long, default_value = ".", help = "Project directory")]
        dir: PathBuf,
        #[arg(short = 'm', long, help = "Model to use")]
        model: Option<String>,
        #[arg(short = 'f', long, value_parser = parse_format, help = "Output format: markdown, html")]
        format: Option<OutputFormat>,
        #[arg(short = 'o', long, help = "Output file")]
        output: Option<PathBuf>,
        #[arg(long, help = "Maximum files to analyze")]
        max_files: Option<usize>,
        #[arg(long, help = "Maximum critique iterations")]
        iterations: Option<u32>,
        #[arg(long, value_parser = parse_project_type, help = "Project type: frontend, backend, mixed (default: detected)")]
        project_type: Option<ProjectType>,
        #[arg(long, help = "Bypass the response cache")]
        no_cache: bool,
    },

    /// Cross-validate an existing document against source code
    Validate {
        #[arg(help = "Document to validate")]
        document: PathBuf,
        #[arg(short = 'd', long, default_value = ".", help = "Project directory")]
        dir: PathBuf,
        #[arg(long, help = "Maximum files to analyze")]
        max_files: Option<usize>,
        #[arg(long, help = "Write a JSON report to this path")]
        report: Option<PathBuf>,
    },

    /// Score a critique text and show the acceptance decision
    Critique {
        #[arg(help = "File containing the critique")]
        file: PathBuf,
    },

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache statistics
    Stats,
    /// Remove every cached response
    Clear,
    /// Remove expired entries and enforce the entry limit
    Prune,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdocloop encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Commands::Config {
        action: ConfigAction::Path,
    } = cli.command
    {
        config::path()?;
        return Ok(());
    }

    let ctx = CommandContext::load(cli.config.as_deref(), cli.quiet)?;

    match cli.command {
        Commands::Generate {
            dir,
            model,
            format,
            output,
            max_files,
            iterations,
            project_type,
            no_cache,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(generate::run(
                &ctx,
                generate::GenerateOptions {
                    dir,
                    model,
                    format,
                    output,
                    max_files,
                    iterations,
                    project_type,
                    no_cache,
                },
            ))?;
        }
        Commands::Validate {
            document,
            dir,
            max_files,
            report,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(validate::run(&ctx, &document, &dir, max_files, report))?;
        }
        Commands::Critique { file } => {
            critique::run(&ctx, &file)?;
        }
        Commands::Cache { action } => {
            let rt = Runtime::new()?;
            match action {
                CacheAction::Stats => rt.block_on(cache::stats(&ctx))?,
                CacheAction::Clear => rt.block_on(cache::clear(&ctx))?,
                CacheAction::Prune => rt.block_on(cache::prune(&ctx))?,
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => config::show(&ctx, &format)?,
            ConfigAction::Path => config::path()?,
        },
    }

    Ok(())
}
