use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use wikirank_core::NoMatchPolicy;
use wikirank_crawler::CrawlConfig;
use wikirank_server::{build_app, build_state, CorpusSource};

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Load this corpus snapshot instead of crawling
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Return the top document even when no document matches the query
    #[arg(long, default_value_t = false)]
    best_guess: bool,
    #[command(flatten)]
    crawl: CrawlConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let source = match args.corpus {
        Some(path) => CorpusSource::Snapshot(path),
        None => CorpusSource::Crawl(args.crawl),
    };
    let policy = if args.best_guess { NoMatchPolicy::BestGuess } else { NoMatchPolicy::Empty };
    let state = build_state(source, policy).await?;
    let stats = state.stats();
    tracing::info!(num_docs = stats.num_docs, num_terms = stats.num_terms, "build phase complete");

    let app = build_app(Arc::new(state));
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
