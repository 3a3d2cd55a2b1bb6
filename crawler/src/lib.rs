//! Corpus acquisition: search-result listing, article extraction, citation
//! metadata and revision history, over a retrying, deadline-bound fetcher.

pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetcher;

pub use crawl::{clamp_result_cap, Crawler};
pub use error::{CrawlError, FetchError, ParseError};
pub use fetcher::Fetcher;

use clap::Args;
use serde::{Deserialize, Serialize};

/// Crawl settings, shared by the crawler and server command lines.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Topics to search for (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "NFL,NBA,MLB,NHL")]
    pub topics: Vec<String>,
    /// Results per topic; clamped to 20..=40
    #[arg(long, default_value_t = 25)]
    pub result_cap: usize,
    /// Term appended to every topic search
    #[arg(long, default_value = "information")]
    pub search_suffix: String,
    /// Site root used for searches and relative links
    #[arg(long, default_value = "https://en.wikipedia.org")]
    pub base_url: String,
    /// Per-request timeout seconds
    #[arg(long, default_value_t = 12)]
    pub timeout_secs: u64,
    /// Extra attempts for transient failures
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,
    /// First retry delay, doubled per attempt
    #[arg(long, default_value_t = 250)]
    pub retry_backoff_ms: u64,
    /// Deadline for the whole crawl, seconds
    #[arg(long, default_value_t = 600)]
    pub deadline_secs: u64,
    /// Documents fetched concurrently across topics
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,
    /// Pause between documents of one topic, milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
    /// User-Agent string sent with every request
    #[arg(long, default_value = "wikirank-bot/0.1 (+https://example.com/bot)")]
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            topics: ["NFL", "NBA", "MLB", "NHL"].map(String::from).to_vec(),
            result_cap: 25,
            search_suffix: "information".into(),
            base_url: "https://en.wikipedia.org".into(),
            timeout_secs: 12,
            max_retries: 2,
            retry_backoff_ms: 250,
            deadline_secs: 600,
            concurrency: 4,
            delay_ms: 0,
            user_agent: "wikirank-bot/0.1 (+https://example.com/bot)".into(),
        }
    }
}
