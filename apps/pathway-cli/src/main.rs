//! Pathway CLI - search a local corpus and decode recorded answer streams.
//!
//! # Usage
//!
//! ```bash
//! pathway search "water filter" --corpus ./corpus -n 5
//! pathway search "water filter" --type guide --json --repeat
//! pathway decode ./answer.ndjson --line-delimited
//! ```

mod decode;
mod output;
mod search;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pathway_core::config::Config;

#[derive(Parser)]
#[command(name = "pathway", version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a hybrid search over a corpus directory
    Search {
        query: String,

        /// Only keep results whose `type` metadata equals this
        #[arg(long = "type")]
        type_filter: Option<String>,

        /// Only keep results whose `source` metadata equals this
        #[arg(long = "source")]
        source_filter: Option<String>,

        /// Maximum number of results to return
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Corpus directory (default: `data.corpus_dir` from config)
        #[arg(long, env = "PATHWAY_CORPUS")]
        corpus: Option<PathBuf>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Run the same search twice to show the cached second answer
        #[arg(long)]
        repeat: bool,
    },
    /// Decode a recorded answer stream, one chunk per line
    Decode {
        file: PathBuf,

        /// Split chunks on newlines instead of treating each chunk as one frame
        #[arg(long)]
        line_delimited: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let fallback = if cli.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("PATHWAY_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let settings = config.settings()?;

    match cli.command {
        Command::Search { query, type_filter, source_filter, limit, corpus, json, repeat } => {
            let args = search::SearchArgs { query, type_filter, source_filter, limit, corpus, json, repeat };
            search::run(&settings, args).await
        }
        Command::Decode { file, line_delimited } => decode::run(&settings, &file, line_delimited).await,
    }
}
