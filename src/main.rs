//! SEO audit agent entry point
//!
//! Serves the JSON-RPC front door by default, or runs a single audit from the
//! command line with `--audit`.

use anyhow::Context;
use clap::Parser;
use seo_auditor::config::{load_config_with_hash, Config};
use seo_auditor::delivery::DeliveryReporter;
use seo_auditor::pipeline::{self, AuditScope};
use seo_auditor::server::{self, AppState};
use seo_auditor::Auditor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// SEO audit agent
///
/// Crawls a site, audits its pages with a text-generation model and posts the
/// report to the caller's webhook.
#[derive(Parser, Debug)]
#[command(name = "seo-auditor")]
#[command(version)]
#[command(about = "AI-assisted SEO audit agent", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and print it without starting the server
    #[arg(long, conflicts_with = "audit")]
    dry_run: bool,

    /// Audit the given URLs once and print the report instead of serving
    #[arg(long, value_name = "URL", num_args = 1..)]
    audit: Vec<Url>,

    /// With --audit, crawl each URL's site instead of auditing only the page
    #[arg(long, requires = "audit")]
    site: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if !cli.audit.is_empty() {
        let scope = if cli.site {
            AuditScope::Site
        } else {
            AuditScope::infer(cli.audit.len())
        };
        handle_audit(&config, &cli.audit, scope).await?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seo_auditor=info,warn"),
            1 => EnvFilter::new("seo_auditor=debug,info"),
            2 => EnvFilter::new("seo_auditor=trace,tower_http=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn handle_dry_run(config: &Config) {
    println!("=== SEO Audit Agent Dry Run ===\n");

    println!("Server:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);

    println!("\nModel:");
    println!("  Endpoint: {}", config.model.endpoint);
    println!("  Model: {}", config.model.model);
    println!(
        "  Timeouts: connect {}s, request {}s",
        config.model.connect_timeout_secs, config.model.request_timeout_secs
    );
    println!(
        "  Default credential: {}",
        if config.model.default_credential.is_some() {
            "set"
        } else {
            "not set"
        }
    );

    println!("\nCrawler:");
    println!("  Page limit: {}", config.crawler.page_limit);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  User-Agent: {}", config.user_agent.header_value());

    println!("\nAudit:");
    println!("  Chunk lines: {}", config.audit.chunk_lines);

    println!("\n✓ Configuration is valid");
}

/// Runs one audit in the foreground and prints the report to stdout
async fn handle_audit(config: &Config, targets: &[Url], scope: AuditScope) -> anyhow::Result<()> {
    let credential = config
        .model
        .default_credential
        .clone()
        .context("--audit needs a credential: set TELEX_API_KEY or model.default-credential")?;
    let auditor = Auditor::new(config)?;

    tracing::info!(targets = targets.len(), scope = ?scope, "Running one-off audit");
    let report = pipeline::execute(&auditor, scope, targets, &credential).await?;

    println!("{}", report.text);
    Ok(())
}

async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let state = AppState {
        auditor: Arc::new(Auditor::new(&config)?),
        reporter: Arc::new(DeliveryReporter::new()?),
        default_credential: config.model.default_credential.clone(),
    };

    if state.default_credential.is_none() {
        tracing::warn!("No default credential configured; callers must send their own");
    }

    server::serve(&config.server, state).await?;
    Ok(())
}
