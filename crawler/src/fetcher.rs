use crate::error::FetchError;
use reqwest::{Client, Url};
use scraper::Html;
use std::time::Duration;

/// Upper bound on a page body; larger responses are rejected unparsed.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// One GET, parsed into a queryable tree. No retries here.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Non-2xx statuses are errors. The returned tree is not `Send`; extract
    /// what you need before the next `.await`.
    pub async fn fetch(&self, url: &Url) -> Result<Html, FetchError> {
        let request_err = |source| FetchError::Request { url: url.to_string(), source };
        let resp = self.client.get(url.clone()).send().await.map_err(request_err)?;
        if !resp.status().is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: resp.status().as_u16() });
        }
        let bytes = resp.bytes().await.map_err(request_err)?;
        if bytes.len() > MAX_BODY_BYTES {
            return Err(FetchError::TooLarge { url: url.to_string(), bytes: bytes.len() });
        }
        tracing::trace!(%url, bytes = bytes.len(), "fetched");
        Ok(Html::parse_document(&String::from_utf8_lossy(&bytes)))
    }
}
