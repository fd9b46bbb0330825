use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use shieldscan::config::{load_scanner_configs, EnvOverrides, Settings};
use shieldscan::output::terminal::{self, BatchSummary};
use shieldscan::output::ScanReport;
use shieldscan::registry::ScannerRegistry;
use shieldscan::scanner::direction::RequestType;

/// shieldscan: run text through configured content-safety guardrails.
///
/// Scanners are defined in a JSON file (SHIELDSCAN_CONFIG, default
/// ./scanners.json). Backend parameters can be overridden with
/// BEDROCK_GUARDRAIL_ID, BEDROCK_GUARDRAIL_VERSION and BEDROCK_REGION.
#[derive(Parser)]
#[command(name = "shieldscan", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a single message
    Scan {
        /// The text to scan
        message: String,

        /// Request type the message belongs to (prompt, reply, enriched_prompt, rag)
        #[arg(long, default_value = "prompt")]
        request_type: String,

        /// Print a JSON report instead of colored output
        #[arg(long)]
        json: bool,
    },

    /// Scan every non-empty line of a file as a separate message
    ScanBatch {
        /// File with one message per line
        input: PathBuf,

        /// Request type the messages belong to
        #[arg(long, default_value = "prompt")]
        request_type: String,

        /// Number of messages to scan in parallel (default: SHIELDSCAN_CONCURRENCY or 4)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Build every configured scanner and list them
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("shieldscan=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command {
        Commands::Scan {
            message,
            request_type,
            json,
        } => {
            let registry = build_registry(&settings)?;
            let request_type = RequestType::from(request_type);
            let outcomes = registry.scan(&message, &request_type).await;

            if json {
                let report = ScanReport::new(request_type.as_str(), &outcomes);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                terminal::display_outcomes(&message, &outcomes);
            }
        }

        Commands::ScanBatch {
            input,
            request_type,
            concurrency,
        } => {
            let registry = build_registry(&settings)?;
            let request_type = RequestType::from(request_type);
            let concurrency = concurrency.unwrap_or(settings.concurrency).max(1);

            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let messages: Vec<&str> = raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();

            info!(
                messages = messages.len(),
                concurrency,
                request_type = %request_type,
                "Starting batch scan"
            );

            let pb = ProgressBar::new(messages.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Scanning [{bar:30}] {pos}/{len} ({eta})")?,
            );

            let registry = &registry;
            let request_type = &request_type;
            let results: Vec<_> = stream::iter(messages.into_iter().map(|message| async move {
                registry.scan(message, request_type).await
            }))
            .buffer_unordered(concurrency)
            .inspect(|_| pb.inc(1))
            .collect()
            .await;
            pb.finish_and_clear();

            let mut summary = BatchSummary::default();
            for outcomes in &results {
                summary.record(outcomes);
            }
            summary.display();
        }

        Commands::CheckConfig => {
            let registry = build_registry(&settings)?;
            terminal::display_scanners(&registry);
            println!("Scanner config at {} is valid.", settings.scanners_path.display());
        }
    }

    Ok(())
}

/// Load scanner definitions and build them with environment overrides.
fn build_registry(settings: &Settings) -> Result<ScannerRegistry> {
    let configs = load_scanner_configs(&settings.scanners_path)?;
    ScannerRegistry::from_configs(&configs, &EnvOverrides).with_context(|| {
        format!(
            "Failed to build scanners from {}",
            settings.scanners_path.display()
        )
    })
}
