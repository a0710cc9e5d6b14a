//! Command definitions, dispatch, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use prospector_core::{
    CancelFlag, PipelineConfig, ProgressReporter, RunReport, RunState, SilentProgress,
    run_pipeline,
};
use prospector_shared::config::RunConfig;
use prospector_shared::{
    SearchCriteria, SourceStats, config_file_path, init_config, load_config, resolve_export_root,
};
use prospector_sources::AdapterRegistry;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Find businesses and the people who run them.
#[derive(Parser)]
#[command(
    name = "prospector",
    version,
    about = "Aggregate business data from multiple sources into merged, contact-scored lead profiles.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress the progress spinner.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full pipeline: discover, merge, score, export.
    Run {
        /// Industry to search for (e.g. "restaurants").
        #[arg(long)]
        industry: String,

        /// Location to search in (e.g. "Seattle, WA").
        #[arg(long)]
        location: String,

        /// Maximum number of distinct businesses (defaults from config).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Export root directory (defaults from config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Replace an existing run directory for the same criteria.
        #[arg(long)]
        overwrite: bool,
    },

    /// List registered source adapters with category and rank.
    Sources,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout
/// stays clean for the run summary.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "prospector=info",
        1 => "prospector=debug",
        _ => "prospector=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            industry,
            location,
            limit,
            out,
            overwrite,
        } => cmd_run(&industry, &location, limit, out, overwrite, cli.quiet).await,
        Command::Sources => cmd_sources().await,
        Command::Config { action } => match action {
            ConfigAction::Init { force } => cmd_config_init(force).await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(
    industry: &str,
    location: &str,
    limit: Option<usize>,
    out: Option<PathBuf>,
    overwrite: bool,
    quiet: bool,
) -> Result<()> {
    let config = load_config()?;

    let limit = limit.unwrap_or(config.defaults.search_limit);
    let criteria = SearchCriteria::new(industry, location, limit)?;
    let export_root = resolve_export_root(&config, out)?;

    let pipeline_config = PipelineConfig {
        criteria,
        export_root,
        overwrite,
        run: RunConfig::from(&config),
    };
    let registry = AdapterRegistry::with_defaults();

    info!(
        industry,
        location,
        limit,
        sources = registry.adapters().len(),
        "starting pipeline run"
    );

    // Ctrl-C requests cancellation; the run stops at the next stage
    // boundary instead of mid-write.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let reporter: Box<dyn ProgressReporter> = if quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(CliProgress::new())
    };

    let report = run_pipeline(&pipeline_config, &registry, reporter.as_ref(), &cancel).await?;

    let threshold = pipeline_config.run.decision_maker_threshold;
    println!();
    println!("  Run complete!");
    println!("  Run ID:          {}", report.result.run_id);
    println!("  Businesses:      {}", report.result.profiles.len());
    println!("  Contacts:        {}", report.result.contact_count());
    println!(
        "  Decision makers: {}",
        report.result.decision_maker_count(threshold)
    );
    println!("  Export:          {}", report.export_path.display());
    println!("  Time:            {:.1}s", report.elapsed.as_secs_f64());
    if !report.result.warnings.is_empty() {
        println!("  Warnings:        {}", report.result.warnings.len());
        for warning in &report.result.warnings {
            println!("    - {warning}");
        }
    }
    println!();

    Ok(())
}

async fn cmd_sources() -> Result<()> {
    let config = load_config()?;
    let registry = AdapterRegistry::with_defaults();

    println!("Registered sources:");
    for adapter in registry.adapters() {
        let rank = config
            .sources
            .reliability
            .get(adapter.source_name())
            .copied()
            .unwrap_or(0);
        println!(
            "  {:<14} category: {:<13} rank: {rank}",
            adapter.source_name(),
            adapter.category()
        );
    }

    Ok(())
}

async fn cmd_config_init(force: bool) -> Result<()> {
    let path = config_file_path()?;
    if path.exists() && !force {
        return Err(eyre!(
            "config already exists at '{}' (pass --force to overwrite)",
            path.display()
        ));
    }

    let path = init_config()?;
    println!("Config written to: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Progress reporter using an indicatif spinner. Draws on stderr, so
/// piping stdout captures only the final summary.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, state: RunState) {
        let message = match state {
            RunState::Discovering => "Discovering businesses across sources",
            RunState::Merging => "Merging records into business profiles",
            RunState::Enriching => "Extracting and scoring contacts",
            RunState::Exporting => "Writing export directory",
            RunState::Completed | RunState::Failed => {
                self.spinner.finish_and_clear();
                return;
            }
            RunState::Pending => return,
        };
        self.spinner.set_message(message);
    }

    fn source_finished(&self, source: &str, stats: &SourceStats) {
        if stats.failed > 0 {
            self.spinner.println(format!(
                "  ! {source}: {}/{} fetches failed",
                stats.failed, stats.attempted
            ));
        } else {
            self.spinner.println(format!("  ✓ {source}"));
        }
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}
