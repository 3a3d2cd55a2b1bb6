use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use wikirank_core::snapshot::read_corpus;
use wikirank_core::{Bm25Params, NoMatchPolicy, RetrievalState};

#[derive(Parser)]
#[command(name = "wikirank-indexer")]
#[command(about = "Build a BM25 index over a corpus snapshot and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print its statistics
    Build {
        /// Input path (.jsonl/.json file or a directory of them)
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 1.5)]
        k1: f64,
        #[arg(long, default_value_t = 0.75)]
        b: f64,
    },
    /// Run one query and print the relevant {title, url} list
    Query {
        #[arg(long)]
        input: PathBuf,
        /// Return the top document even when nothing matches
        #[arg(long, default_value_t = false)]
        best_guess: bool,
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, k1, b } => {
            let state = RetrievalState::build_with(read_corpus(&input)?, Bm25Params { k1, b }, NoMatchPolicy::Empty)?;
            println!("{}", serde_json::to_string_pretty(&state.stats())?);
            Ok(())
        }
        Commands::Query { input, best_guess, query } => {
            let policy = if best_guess { NoMatchPolicy::BestGuess } else { NoMatchPolicy::Empty };
            let state = RetrievalState::build_with(read_corpus(&input)?, Bm25Params::default(), policy)?;
            let hits: Vec<_> = state.search(&query).iter().map(|r| r.hit()).collect();
            tracing::info!(query = %query, hits = hits.len(), "query complete");
            println!("{}", serde_json::to_string_pretty(&hits)?);
            Ok(())
        }
    }
}
