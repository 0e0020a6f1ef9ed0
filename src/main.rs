//! Idle User Disabler
//!
//! Audits the users of an identity domain and disables accounts that have not
//! logged in within a configurable number of days.

#![deny(clippy::all)]

mod audit;
mod auth;
mod config;
mod error;
mod identity;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use audit::classifier::run_clock;
use audit::{AuditOptions, AuditRun};
use auth::AuthMode;
use config::Config;
use error::AppError;
use identity::{ClientOptions, IdentityDomainClient};

#[derive(Parser)]
#[command(name = "idle-user-disabler")]
#[command(version, about = "Disable identity domain users inactive for too long", long_about = None)]
struct Cli {
    /// Identity domain URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Number of days of inactivity before a user is disabled
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    days: Option<u32>,

    /// Evaluate users without deactivating
    #[arg(long)]
    dry_run: bool,

    /// Show full user identifiers
    #[arg(short, long)]
    verbose: bool,

    /// How to obtain the access token (default: token if IDCS_ACCESS_TOKEN is set)
    #[arg(long, value_enum)]
    auth: Option<AuthMode>,

    /// Configuration file to use instead of the built-in defaults
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        // .env file is optional - only log if it's not a "file not found" error
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {:#}", "Configuration error".red(), e);
            eprintln!("\nSet the identity domain with --endpoint or IDCS_ENDPOINT, and credentials with:");
            eprintln!("  IDCS_ACCESS_TOKEN=<bearer-token>");
            eprintln!("  or IDCS_CLIENT_ID=<client-id> and IDCS_CLIENT_SECRET=<client-secret>");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging.level, cli.debug);
    report::init_colors();

    info!("Starting {} v{}", config.app.name, config.app.version);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli.auth, config)) {
        error!("Audit aborted: {:#}", e);
        match e.downcast_ref::<AppError>() {
            Some(app_error) => eprintln!("{}: {}", "Error".red(), app_error.user_message()),
            None => eprintln!("{}: {:#}", "Error".red(), e),
        }
        std::process::exit(1);
    }
}

/// Load configuration and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(endpoint) = &cli.endpoint {
        config.identity.endpoint = endpoint.clone();
    }
    if let Some(days) = cli.days {
        config.audit.threshold_days = days;
    }
    config.audit.dry_run |= cli.dry_run;
    config.audit.verbose_identifiers |= cli.verbose;

    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging on stderr so the report on stdout stays clean.
fn init_logging(level: &str, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Authenticate, audit every user, and print the report.
async fn run(requested_auth: Option<AuthMode>, config: Config) -> Result<()> {
    // One clock reading for the whole run
    let now = run_clock();
    let verbose = config.audit.verbose_identifiers;

    report::print_banner(
        &config.app.name,
        now,
        config.audit.threshold_days,
        config.audit.dry_run,
    );

    let mode = auth::resolve_mode(requested_auth, &config);
    let token = auth::acquire_token(mode, &config)
        .await
        .map_err(AppError::from)
        .context("Failed to authenticate")?;

    let client = IdentityDomainClient::new(
        config.endpoint_url()?,
        token,
        ClientOptions {
            page_size: config.identity.page_size,
            timeout: config.http_timeout(),
            connect_timeout: config.connect_timeout(),
        },
    )
    .map_err(AppError::from)?;

    let options = AuditOptions {
        threshold_days: config.audit.threshold_days,
        dry_run: config.audit.dry_run,
    };

    let mut audit = AuditRun::fetch(&client, options, now)
        .await
        .map_err(AppError::from)
        .context("Failed to list users")?;

    report::print_users(&audit.users, verbose);

    let candidates = audit.candidates();
    info!("{} users selected for deactivation", candidates.len());

    let outcomes = audit.disable(&client, candidates).await;

    report::print_outcomes(&outcomes, audit.options.dry_run, verbose);
    report::print_summary(&audit.summary);

    info!("Audit complete: {}", audit.summary);
    Ok(())
}
