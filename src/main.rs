use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsharvest::config::Config;
use newsharvest::crawler::AssetFailurePolicy;
use newsharvest::error::Error;
use newsharvest::models::TaskInput;

mod commands;

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(
    name = "newsharvest",
    version,
    about = "Collect recent news articles for a search phrase into an xlsx report",
    long_about = None
)]
struct Cli {
    /// Search phrase
    #[arg(short, long)]
    phrase: Option<String>,

    /// Category filter to apply when the site offers a matching one
    #[arg(short, long)]
    category: Option<String>,

    /// Recency window in months (1 = current month only)
    #[arg(short = 'm', long)]
    last_months: Option<i64>,

    /// JSON work-item file with phrase, category and last_months
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// TOML configuration file (defaults to environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for the report and images
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// What to do when an image cannot be downloaded (abort, skip_record)
    #[arg(long)]
    on_asset_failure: Option<AssetFailurePolicy>,

    /// Replay a captured feed (JSON array of pages) instead of the live site
    #[arg(long)]
    feed_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return exit_code(&err);
        }
    };

    if let Err(err) = setup_tracing(&config.logging.format, &config.logging.level, cli.verbose) {
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    }

    tracing::info!("newsharvest starting");

    let cancel = Arc::new(AtomicBool::new(false));
    spawn_ctrl_c_handler(cancel.clone());

    let outcome = match task_input(&cli) {
        Ok(input) => {
            let params = commands::HarvestParams {
                input,
                feed_file: cli.feed_file.clone(),
            };
            commands::harvest(config, params, cancel).await
        }
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => {
            tracing::info!("newsharvest completed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Harvest failed");
            eprintln!("Error: {err:#}");
            exit_code(&err)
        }
    }
}

/// Configuration from file or environment, with command line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
    .map_err(|e| Error::config(format!("{e:#}")))?;

    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(policy) = cli.on_asset_failure {
        config.assets.on_failure = policy;
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    config
        .validate()
        .map_err(|e| Error::config(format!("{e:#}")))?;

    Ok(config)
}

/// Work-item file values overlaid with explicit flags
fn task_input(cli: &Cli) -> Result<TaskInput> {
    let from_file = match &cli.input {
        Some(path) => TaskInput::from_file(path)
            .with_context(|| format!("Failed to load work item: {}", path.display()))?,
        None => TaskInput::default(),
    };

    Ok(from_file.merge(TaskInput {
        phrase: cli.phrase.clone(),
        category: cli.category.clone(),
        last_months: cli.last_months,
    }))
}

/// First interrupt requests a graceful stop, the second exits immediately
fn spawn_ctrl_c_handler(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if record_interrupt(&cancel) {
                tracing::error!("Second interrupt received, exiting");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            tracing::warn!("Interrupt received, stopping after the current step");
        }
    });
}

/// Raise the cancel flag; true when it was already raised
fn record_interrupt(cancel: &AtomicBool) -> bool {
    cancel.swap(true, Ordering::SeqCst)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("newsharvest=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(format!("newsharvest={level},warn"))
            })
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Map a failure to the exit code of its error category
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let code = err
        .downcast_ref::<Error>()
        .map(|e| e.category().exit_code())
        .unwrap_or(1);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
