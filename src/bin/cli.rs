//! Pretalx Sync CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pretalx_sync::{
    config,
    error::Result,
    models::{Config, StepStatus},
    pipeline::Pretalx,
    utils::url::endpoint_url,
};

/// pretalx-sync - Pretalx API mirror
#[derive(Parser, Debug)]
#[command(
    name = "pretalx-sync",
    version,
    about = "Sync Pretalx event data into a local JSON cache"
)]
struct Cli {
    /// Project directory containing config.toml and the cache directories
    #[arg(short, long, default_value = ".")]
    project_dir: PathBuf,

    /// Project configuration file (default: {project_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override for the built-in base configuration
    #[arg(long)]
    base_config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh all API sections and regenerate derived files
    Refresh {
        /// Refresh only this section
        #[arg(long)]
        section: Option<String>,
    },

    /// Regenerate derived files from cached data
    Export,

    /// Add speaker names and slugs to submissions
    Preprocess,

    /// Validate the merged configuration
    Validate,

    /// Show configured sections and cache status
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn log_steps(steps: &[(String, StepStatus)]) -> bool {
    let mut ok = true;
    for (name, status) in steps {
        match status {
            StepStatus::Refreshed { records } => log::info!("✓ {name}: {records}"),
            StepStatus::Empty => log::warn!("- {name}: no records returned, cache kept"),
            StepStatus::Written { values } => log::info!("✓ {name}: {values} entries written"),
            StepStatus::Skipped { reason } => log::info!("- {name}: skipped ({reason})"),
            StepStatus::Failed { error } => {
                log::error!("✗ {name}: {error}");
                ok = false;
            }
        }
    }
    ok
}

fn show_info(config: &Config, cli: &Cli) -> Result<()> {
    log::info!("Project directory: {}", cli.project_dir.display());
    log::info!(
        "Event: {} on {} (language: {})",
        config.pretalx.event_slug,
        config.pretalx.base_url,
        config.pretalx.language
    );
    log::info!(
        "API token: {}",
        if config.pretalx.token().is_ok() {
            "found"
        } else {
            "not found"
        }
    );

    for section in &config.sections {
        let url = endpoint_url(
            &config.pretalx.base_url,
            &config.pretalx.event_slug,
            section.endpoint(),
        )?;
        let cache = cli.project_dir.join(&section.raw_path);
        log::info!(
            "{} [{}] {} -> {} ({})",
            section.name,
            if section.api_section { "api" } else { "off" },
            url,
            section.raw_path,
            if cache.is_file() { "cached" } else { "no cache" }
        );
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_layered(
        &cli.project_dir,
        cli.config.as_deref(),
        cli.base_config.as_deref(),
    )?;
    log::info!("Loaded configuration from {}", cli.project_dir.display());

    let ok = match &cli.command {
        Command::Refresh { section: Some(name) } => {
            let mut pretalx = Pretalx::connect(config, &cli.project_dir).await?;
            let count = pretalx.refresh_section(name).await?;
            log::info!("Refreshed {name}: {count} records");
            true
        }

        Command::Refresh { section: None } => {
            let mut pretalx = Pretalx::connect(config, &cli.project_dir).await?;
            let report = pretalx.refresh_all().await;

            log_steps(&report.sections);
            log_steps(&report.derived);
            log::info!(
                "Fetched {} records in {:.1}s",
                report.record_count(),
                (report.end_time - report.start_time).num_milliseconds() as f64 / 1000.0
            );
            report.is_success()
        }

        Command::Export => {
            let mut pretalx = Pretalx::connect(config, &cli.project_dir).await?;
            let steps = pretalx.export_derived().await;
            log_steps(&steps)
        }

        Command::Preprocess => {
            let mut pretalx = Pretalx::connect(config, &cli.project_dir).await?;
            pretalx.preprocess_submissions().await?;
            true
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} sections, {} synced)",
                config.sections.len(),
                config.api_sections().count()
            );
            if config.pretalx.token().is_err() {
                log::warn!(
                    "No API token found; set {} or create {}/{}",
                    config::TOKEN_ENV,
                    config.pretalx.token_dir,
                    config.pretalx.token_file_name
                );
            }
            true
        }

        Command::Info => {
            show_info(&config, &cli)?;
            true
        }
    };

    if ok {
        log::info!("Done!");
        Ok(ExitCode::SUCCESS)
    } else {
        log::error!("Finished with failures");
        Ok(ExitCode::FAILURE)
    }
}
