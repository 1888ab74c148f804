//! formtrap CLI
//!
//! Replays recorded form interactions through the detector and prints the
//! pieces a host page needs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use formtrap::{
    config::GuardConfig,
    core::SubmitOutcome,
    honeypot::render_honeypot,
    replay::{replay, ReplayTrace},
    DISCLOSURE, VERSION,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formtrap")]
#[command(version = VERSION)]
#[command(about = "Behavioral and honeypot bot detection for web forms", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded interaction trace and print the verdict
    Replay {
        /// Path to a JSON trace
        trace: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print honeypot field markup for the configured names
    Fields,

    /// Show the effective configuration
    Config,

    /// Display the detection notice
    Disclosure,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formtrap=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(GuardConfig::config_path);

    match cli.command {
        Commands::Replay { trace, json } => cmd_replay(&trace, &config_path, json).await,
        Commands::Fields => cmd_fields(&config_path),
        Commands::Config => cmd_config(&config_path),
        Commands::Disclosure => {
            println!("{DISCLOSURE}");
            Ok(())
        }
    }
}

async fn cmd_replay(trace_path: &Path, config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let trace = ReplayTrace::load(trace_path)
        .with_context(|| format!("loading trace {}", trace_path.display()))?;

    let outcome = replay(&trace, config).await;
    let verdict = match outcome {
        SubmitOutcome::Submitted(_) => "submitted",
        SubmitOutcome::BotDetected(_) => "withheld (bot)",
        SubmitOutcome::HandlerFailed(_) => "handler failed",
        SubmitOutcome::InProgress => "in progress",
    };

    let Some(result) = outcome.result() else {
        println!("Verdict: {verdict}");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("Verdict: {verdict}");
        println!();
        println!("{}", result.summary());
    }
    Ok(())
}

fn cmd_fields(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    if config.honeypot_fields.is_empty() {
        eprintln!("No honeypot fields configured; the honeypot signal is disabled.");
        return Ok(());
    }
    println!("{}", render_honeypot(&config.honeypot_fields));
    Ok(())
}

fn cmd_config(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {config_path:?}");
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<GuardConfig> {
    GuardConfig::load_or_default(path)
        .with_context(|| format!("loading config {}", path.display()))
}
