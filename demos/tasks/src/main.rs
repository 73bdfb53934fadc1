//! docflow tasks demo
//!
//! Walks through the docflow wrappers against the in-memory store.
//!
//! # Commands
//!
//! - `list` - Batch-write the sample tasks and query them
//! - `retry` - Run a counter transaction against injected failures
//! - `watch` - Follow a task while it is edited, until the listener is revoked
//! - `atomic` - Show that a batch with a missing update target changes nothing

mod commands;

use clap::{Parser, Subcommand};
use docflow_memory::{MemoryStore, MemoryStoreConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// docflow walkthrough over an in-memory document store.
#[derive(Parser)]
#[command(name = "docflow-tasks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Simulated round-trip latency in milliseconds
    #[arg(global = true, long, default_value = "0")]
    latency_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Batch-write the sample tasks and list them by priority
    List {
        /// Only tasks tagged "urgent"
        #[arg(short, long)]
        urgent: bool,

        /// Maximum number of tasks to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Run a counter transaction against injected failures
    Retry {
        /// Maximum number of attempts
        #[arg(short, long, default_value = "5")]
        attempts: u32,

        /// Number of attempts the store will reject
        #[arg(short, long, default_value = "2")]
        failures: usize,
    },

    /// Follow a task while it is edited, until the listener is revoked
    Watch,

    /// Show that a batch with a missing update target changes nothing
    Atomic,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = MemoryStore::with_config(
        MemoryStoreConfig::new().with_latency(Duration::from_millis(cli.latency_ms)),
    );

    match cli.command {
        Commands::List { urgent, limit } => commands::list(&store, urgent, limit).await?,
        Commands::Retry { attempts, failures } => {
            commands::retry(&store, attempts, failures).await?
        }
        Commands::Watch => commands::watch(&store).await?,
        Commands::Atomic => commands::atomic(&store).await?,
    }

    Ok(())
}
