use thiserror::Error;

/// Failure of a single network retrieval.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} body is {bytes} bytes, over the limit")]
    TooLarge { url: String, bytes: usize },
    #[error("invalid url: {url}")]
    InvalidUrl { url: String },
    #[error("crawl deadline passed before {url} was fetched")]
    DeadlineExceeded { url: String },
    #[error("http client setup failed: {0}")]
    Client(reqwest::Error),
}

impl FetchError {
    /// Timeouts, dropped connections, 5xx and 429 are worth another attempt.
    /// Everything else (404, bad urls, the crawl deadline) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { source, .. } => source.is_timeout() || source.is_connect() || source.is_body(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// An expected element is missing from a fetched page. The affected field degrades.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{what} not found on {url}")]
    MissingElement { what: &'static str, url: String },
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
