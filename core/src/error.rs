use thiserror::Error;

/// Fatal failures of the build phase, surfaced to whoever triggered it.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("corpus is empty: no documents were retrieved for any topic")]
    EmptyCorpus,
    #[error("crawl failed: {0}")]
    Crawl(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot i/o on {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("malformed snapshot record in {path} (line {line}): {source}")]
    Json { path: String, line: usize, source: serde_json::Error },
}
