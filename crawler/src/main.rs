use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use wikirank_core::snapshot::write_jsonl;
use wikirank_core::BuildError;
use wikirank_crawler::{CrawlConfig, Crawler};

#[derive(Parser, Debug)]
#[command(name = "wikirank-crawler")]
#[command(about = "Crawl topic search results into a JSONL corpus snapshot")]
struct Cli {
    #[command(flatten)]
    crawl: CrawlConfig,
    /// Output JSONL file path
    #[arg(long, default_value = "./sample_data/corpus.jsonl")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let crawler = Crawler::new(args.crawl)?;
    let corpus = crawler.crawl_configured().await;
    if corpus.is_empty() {
        return Err(BuildError::EmptyCorpus.into());
    }
    write_jsonl(&args.output, &corpus)?;
    tracing::info!(docs = corpus.len(), output = %args.output.display(), "done");
    Ok(())
}
