//! # medcred CLI entry point
//!
//! Parses command-line arguments, resolves configuration, initializes
//! tracing, wires the application once and dispatches to subcommand
//! handlers.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use medcred_cli::compose::compose;
use medcred_cli::config::{LogFormat, MedcredConfig, Overrides};
use medcred_cli::dea::{run_dea, DeaArgs};
use medcred_cli::dispatch::{run_dispatch, DispatchArgs};
use medcred_cli::history::{run_history, HistoryArgs};
use medcred_cli::license::{run_license, LicenseArgs};
use medcred_cli::npi::{run_npi, NpiArgs};
use medcred_cli::templates::{run_templates, TemplatesArgs};
use medcred_cli::OutputFormat;

/// Synthetic medical credential generator and validator.
///
/// Generates and validates NPI numbers, DEA / NDEA registration numbers
/// and state license numbers. Generated values are synthetic test data and
/// are not registered with any authority.
#[derive(Parser, Debug)]
#[command(name = "medcred", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database URL or path. Without one, credentials are kept in memory.
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Seed the random source for reproducible output.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log format on stderr.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Result format on stdout.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate or validate National Provider Identifiers.
    Npi(NpiArgs),

    /// Generate or validate DEA and NDEA registration numbers.
    Dea(DeaArgs),

    /// Generate or validate state license numbers.
    License(LicenseArgs),

    /// List recently issued credentials of one kind.
    History(HistoryArgs),

    /// Show the license number format for each state.
    Templates(TemplatesArgs),

    /// Route tagged JSON commands through the command registry.
    Dispatch(DispatchArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = Overrides {
        database_url: cli.database_url.clone(),
        rng_seed: cli.seed,
        log_format: cli.log_format,
    };
    let config = MedcredConfig::load(cli.config.as_deref(), &overrides);
    let log_format = match &config {
        Ok(config) => config.log_format,
        Err(_) => overrides.log_format.unwrap_or_default(),
    };
    init_tracing(cli.verbose, log_format);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "medcred starting");

    let result = match config {
        Ok(config) => run(cli.command, &config, cli.output).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins when set and no `-v` was given; otherwise verbosity
/// picks the level.
fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(command: Commands, config: &MedcredConfig, format: OutputFormat) -> anyhow::Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Commands::Templates(args) = &command {
        return run_templates(args, format, &mut out);
    }

    let app = compose(config)
        .await
        .context("could not open the credential store")?;
    let service = app.service.as_ref();

    let code = match &command {
        Commands::Npi(args) => run_npi(args, service, format, &mut out).await?,
        Commands::Dea(args) => run_dea(args, service, format, &mut out).await?,
        Commands::License(args) => run_license(args, service, format, &mut out).await?,
        Commands::History(args) => run_history(args, service, format, &mut out).await?,
        Commands::Dispatch(args) => {
            run_dispatch(args, &app.registry, std::io::stdin().lock(), &mut out).await?
        }
        Commands::Templates(args) => run_templates(args, format, &mut out)?,
    };
    out.flush()?;
    Ok(code)
}
