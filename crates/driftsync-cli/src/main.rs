//! driftsync - Directory tree synchronization tool
//!
//! Scans a destination tree against a source tree, reports the drift between
//! them, and applies the minimal set of copy operations to bring the
//! destination up to date.

mod display;
mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use driftsync_config::{Config, ConfigLoader, LoggingConfig};
use driftsync_diff::{CompareEngine, CompareOptions, ReportStore};
use driftsync_engine::{
    Action, CancellationToken, DecisionFn, ExecOptions, PlanOptions, UpdateExecutor,
    UpdateJournal, UpdatePlanner,
};
use driftsync_scan::{ScanOptions, TreeScanner};
use driftsync_types::{Cancellable, DuplicatePolicy, RelocatedPolicy};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// driftsync - Directory tree synchronization tool
#[derive(Parser)]
#[command(
    name = "driftsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Directory tree synchronization tool",
    long_about = "driftsync compares a destination directory tree against a source tree,\n\
                  classifies every file as new, modified, unchanged or missing, optionally\n\
                  resolves moved and duplicated content by fingerprinting, and applies the\n\
                  resulting update plan with a persistent journal."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan two trees and save a drift report
    Scan {
        /// Destination directory (the tree to bring up to date)
        destination: PathBuf,
        /// Source directory (the tree to take files from)
        source: PathBuf,
        /// Directory receiving the report file
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Resolve moved and duplicated content by fingerprinting
        #[arg(long)]
        deep: bool,
        /// Timestamp tolerance in seconds
        #[arg(long, value_name = "SECS")]
        mtime_tolerance: Option<u64>,
        /// Follow symbolic links while scanning
        #[arg(long, value_name = "BOOL")]
        follow_symlinks: Option<bool>,
    },
    /// Apply a saved report to the destination tree
    Apply {
        /// Directory holding the report and receiving the journal
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Report file to apply, overriding the one in the output directory
        #[arg(long)]
        report: Option<PathBuf>,
        /// Policy for files duplicating existing destination content
        #[arg(long, value_enum)]
        duplicates: Option<DuplicatesArg>,
        /// Policy for files that moved within the tree
        #[arg(long, value_enum)]
        relocated: Option<RelocatedArg>,
        /// Concurrent copy operations (0 = number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Print the plan without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },
    /// Show a saved report
    Show {
        /// Report file to show
        #[arg(long, conflicts_with = "output")]
        report: Option<PathBuf>,
        /// Directory holding the report
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Show configuration
    Config {
        /// Show the built-in default configuration
        #[arg(long)]
        default: bool,
        /// Write a default configuration file and exit
        #[arg(long, value_name = "FILE", conflicts_with = "default")]
        init: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum DuplicatesArg {
    Copy,
    Skip,
    Ask,
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(arg: DuplicatesArg) -> Self {
        match arg {
            DuplicatesArg::Copy => DuplicatePolicy::CopyAnyway,
            DuplicatesArg::Skip => DuplicatePolicy::Skip,
            DuplicatesArg::Ask => DuplicatePolicy::AskEachTime,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum RelocatedArg {
    Skip,
    Copy,
}

impl From<RelocatedArg> for RelocatedPolicy {
    fn from(arg: RelocatedArg) -> Self {
        match arg {
            RelocatedArg::Skip => RelocatedPolicy::Skip,
            RelocatedArg::Copy => RelocatedPolicy::CopyToAlternate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(cli.debug, cli.quiet, cli.verbose, &config.logging)?;

    info!("driftsync v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Scan {
            destination,
            source,
            output,
            deep,
            mtime_tolerance,
            follow_symlinks,
        } => {
            scan_command(
                destination,
                source,
                output,
                deep,
                mtime_tolerance,
                follow_symlinks,
                &config,
                cli.quiet,
            )
            .await?;
        }
        Commands::Apply {
            output,
            report,
            duplicates,
            relocated,
            jobs,
            dry_run,
        } => {
            apply_command(
                output, report, duplicates, relocated, jobs, dry_run, &config, cli.quiet,
            )
            .await?;
        }
        Commands::Show { report, output } => {
            show_command(report, output, &config).await?;
        }
        Commands::Config { default, init } => {
            config_command(default, init, cli.config, &config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path).with_context(|| {
            format!("Failed to load configuration from '{}'", path.display())
        }),
        None => ConfigLoader::load_default().context("Failed to load configuration"),
    }
}

fn init_logging(debug: bool, quiet: bool, verbose: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap();

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(logging.colored_output)
        .init();

    Ok(())
}

async fn scan_command(
    destination: PathBuf,
    source: PathBuf,
    output: PathBuf,
    deep: bool,
    mtime_tolerance: Option<u64>,
    follow_symlinks: Option<bool>,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    info!("Starting scan");
    info!("Source: {}", source.display());
    info!("Destination: {}", destination.display());

    if !quiet {
        println!(
            "{} Comparing {} against {}",
            style("⟲").blue().bold(),
            style(destination.display()).cyan(),
            style(source.display()).cyan()
        );
    }

    let scan_options = ScanOptions {
        follow_symlinks: follow_symlinks.unwrap_or(config.scan.follow_symlinks),
        progress_every: config.scan.progress_every,
    };

    let spinner = progress::ScanSpinner::start(quiet);
    let mut scanner = TreeScanner::new(scan_options);
    if let Some(observer) = spinner.observer() {
        scanner = scanner.with_observer(observer);
    }

    let (source_index, destination_index) = scanner.scan_pair(&source, &destination).await?;

    spinner.set_message("Comparing trees...");
    let compare_options = CompareOptions {
        mtime_tolerance: Duration::from_secs(
            mtime_tolerance.unwrap_or(config.compare.mtime_tolerance_secs),
        ),
        deep_scan: deep || config.compare.deep_scan,
        hash_concurrency: 0,
    };
    let report = CompareEngine::new(compare_options)
        .compare(&source_index, &destination_index)
        .await;

    let report_path = output.join(&config.compare.report_file);
    ReportStore::save(&report, &report_path).await?;
    spinner.finish_and_clear();

    if !quiet {
        display::display_report(&report);
        display::display_warnings(&report);
        display::display_success(&format!("Report saved to {}", report_path.display()));
    }

    info!("Scan completed");
    Ok(())
}

async fn apply_command(
    output: PathBuf,
    report: Option<PathBuf>,
    duplicates: Option<DuplicatesArg>,
    relocated: Option<RelocatedArg>,
    jobs: Option<usize>,
    dry_run: bool,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    let report_path = report.unwrap_or_else(|| output.join(&config.compare.report_file));
    info!("Loading report from {}", report_path.display());
    let report = ReportStore::load(&report_path).await?;

    if !quiet {
        println!(
            "{} Applying {} to {}",
            style("→").green().bold(),
            style(report_path.display()).cyan(),
            style(report.destination_root.display()).cyan()
        );
    }

    let duplicate_policy = duplicates
        .map(DuplicatePolicy::from)
        .unwrap_or(config.update.duplicate_policy);
    let relocated_policy = relocated
        .map(RelocatedPolicy::from)
        .unwrap_or(config.update.relocated_policy);

    let plan = UpdatePlanner::new(PlanOptions {
        duplicate_policy,
        relocated_policy,
        modified_filter: None,
    })
    .plan(&report);

    if plan.is_empty() {
        display::display_success("Nothing to do, the trees are in sync");
        return Ok(());
    }

    if dry_run {
        display::display_info("Dry run - no changes will be made");
        display::display_plan(&plan);
        return Ok(());
    }

    let mut jobs = jobs.unwrap_or(config.update.jobs);
    if jobs == 0 {
        jobs = num_cpus::get();
    }

    let decide = if duplicate_policy == DuplicatePolicy::AskEachTime {
        if jobs > 1 {
            display::display_warning("Interactive confirmations force sequential copying");
            jobs = 1;
        }
        Some(confirm_callback())
    } else {
        None
    };

    let token = CancellationToken::new();
    spawn_ctrl_c_handler(token.clone());

    let bar = progress::ApplyBar::start(plan.len() as u64, quiet);
    let mut journal = UpdateJournal::open(output.join(&config.update.journal_file)).await?;

    let mut executor = UpdateExecutor::new(ExecOptions {
        jobs,
        preserve_mtime: config.update.preserve_mtime,
        decide,
    })
    .with_cancellation(token);
    if let Some(observer) = bar.observer() {
        executor = executor.with_observer(observer);
    }

    let summary = executor.execute(&plan, &mut journal).await?;
    bar.finish_and_clear();

    if !quiet {
        display::display_execution_summary(&summary);
        if summary.failed > 0 {
            display::display_error(&format!(
                "{} action(s) failed, see {}",
                summary.failed,
                journal.path().display()
            ));
        }
    }

    if summary.cancelled {
        return Err(driftsync_types::Error::Cancelled.into());
    }

    info!("Apply completed: {}", summary);
    Ok(())
}

async fn show_command(
    report: Option<PathBuf>,
    output: PathBuf,
    config: &Config,
) -> Result<()> {
    let report_path = report.unwrap_or_else(|| output.join(&config.compare.report_file));
    let report = ReportStore::load(&report_path).await?;

    println!(
        "{} Report {}",
        style("⟲").blue().bold(),
        style(report_path.display()).cyan()
    );
    display::display_report(&report);
    display::display_warnings(&report);
    Ok(())
}

fn config_command(
    default: bool,
    init: Option<PathBuf>,
    config_path: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    if let Some(path) = init {
        ConfigLoader::generate_default_config(&path)?;
        display::display_success(&format!(
            "Wrote default configuration to {}",
            path.display()
        ));
        return Ok(());
    }

    let (label, shown) = if default {
        ("Default configuration:", Config::default())
    } else {
        ("Current configuration:", config.clone())
    };
    println!("{} {}", style("⚙").blue().bold(), style(label).bold());
    print!("{}", serde_yaml::to_string(&shown)?);

    if !default {
        match config_path.or_else(ConfigLoader::config_exists) {
            Some(path) => display::display_info(&format!("Loaded from {}", path.display())),
            None => display::display_info("No configuration file found, using defaults"),
        }
    }
    Ok(())
}

/// Interactive confirmation for duplicate copies under the ask policy
fn confirm_callback() -> DecisionFn {
    Arc::new(|action: &Action| {
        let detail = action
            .note
            .clone()
            .unwrap_or_else(|| "duplicate content".to_string());
        dialoguer::Confirm::new()
            .with_prompt(format!("'{}': {}. Copy anyway?", action.relative, detail))
            .default(false)
            .interact()
            .unwrap_or(false)
    })
}

fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}
