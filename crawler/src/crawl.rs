use crate::error::{CrawlError, FetchError, ParseError};
use crate::extract::{self, Citation};
use crate::fetcher::Fetcher;
use crate::CrawlConfig;
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, sleep_until, timeout_at, Instant};
use tracing::{debug, error, info, warn};
use url::Url;
use wikirank_core::document::word_count;
use wikirank_core::{Corpus, Document};

/// Results shown per search-results page.
pub const RESULTS_PER_PAGE: usize = 20;
/// Hard ceiling on results taken per topic.
pub const MAX_RESULTS: usize = 40;

/// Effective per-topic result count: at least one full page, never more than two.
pub fn clamp_result_cap(requested: usize) -> usize { requested.max(RESULTS_PER_PAGE).min(MAX_RESULTS) }

/// Far-off instant used when a configured duration does not fit.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

fn after(now: Instant, wait: Duration) -> Instant { now.checked_add(wait).unwrap_or_else(|| now + FAR_FUTURE) }

/// Pause before retry number `attempt + 1`: `base_ms * 2^attempt`, saturating.
fn backoff(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms).checked_mul(2u32.saturating_pow(attempt)).unwrap_or(Duration::MAX)
}

/// State shared by the topic tasks of one crawl run.
#[derive(Clone, Copy)]
struct Run {
    deadline: Instant,
}

impl Run {
    fn expired(&self) -> bool { Instant::now() >= self.deadline }
}

fn norm(u: &Url) -> String { let mut s = u.clone(); s.set_fragment(None); s.to_string() }

/// Keep each url only under the first topic (in topic order) that lists it.
fn first_listing_wins(listings: Vec<(String, Vec<Url>)>) -> Vec<(String, Vec<Url>)> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .map(|(topic, urls)| {
            let fresh: Vec<Url> = urls
                .into_iter()
                .filter(|url| {
                    let first = seen.insert(norm(url));
                    if !first {
                        debug!(topic = %topic, %url, "already listed under an earlier topic");
                    }
                    first
                })
                .collect();
            (topic, fresh)
        })
        .collect()
}

#[derive(Clone)]
pub struct Crawler {
    config: Arc<CrawlConfig>,
    base: Url,
    fetcher: Fetcher,
    permits: Arc<Semaphore>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, FetchError> {
        let base = Url::parse(&config.base_url).map_err(|_| FetchError::InvalidUrl { url: config.base_url.clone() })?;
        let fetcher = Fetcher::new(&config.user_agent, Duration::from_secs(config.timeout_secs))?;
        let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));
        Ok(Self { config: Arc::new(config), base, fetcher, permits })
    }

    pub fn config(&self) -> &CrawlConfig { &self.config }

    /// Crawl the configured topics with the configured cap.
    pub async fn crawl_configured(&self) -> Corpus { self.crawl(&self.config.topics, self.config.result_cap).await }

    /// Topics are listed concurrently, then each url is assigned to the first
    /// topic (in the order given) that lists it. Documents are then fetched
    /// per topic concurrently and merged in topic order, so the corpus order
    /// does not depend on timing. A topic whose listing fails contributes
    /// nothing; a document that fails is dropped alone. Work stops at the
    /// configured deadline, keeping what was collected.
    pub async fn crawl(&self, topics: &[String], result_cap: usize) -> Corpus {
        let cap = clamp_result_cap(result_cap);
        let run = Run { deadline: after(Instant::now(), Duration::from_secs(self.config.deadline_secs)) };
        info!(topics = topics.len(), cap, concurrency = self.config.concurrency, "starting crawl");

        let listing_tasks: Vec<_> = topics
            .iter()
            .map(|topic| {
                let crawler = self.clone();
                let topic = topic.clone();
                tokio::spawn(async move { crawler.list_results(&topic, cap, &run).await })
            })
            .collect();

        let mut listings = Vec::with_capacity(topics.len());
        for (topic, handle) in topics.iter().zip(listing_tasks) {
            match handle.await {
                Ok(Ok(urls)) => {
                    debug!(topic = %topic, candidates = urls.len(), "collected result links");
                    listings.push((topic.clone(), urls));
                }
                Ok(Err(e)) => warn!(topic = %topic, error = %e, "topic listing failed; skipping topic"),
                Err(e) => error!(topic = %topic, error = %e, "listing task aborted"),
            }
        }

        let document_tasks: Vec<_> = first_listing_wins(listings)
            .into_iter()
            .map(|(topic, urls)| {
                let crawler = self.clone();
                let task_topic = topic.clone();
                (topic, tokio::spawn(async move { crawler.crawl_documents(&task_topic, urls, &run).await }))
            })
            .collect();

        let mut documents = Vec::new();
        for (topic, handle) in document_tasks {
            match handle.await {
                Ok(docs) => {
                    info!(topic = %topic, docs = docs.len(), "topic crawled");
                    documents.extend(docs);
                }
                Err(e) => error!(topic = %topic, error = %e, "topic task aborted"),
            }
        }
        info!(docs = documents.len(), "crawl finished");
        Corpus::new(documents)
    }

    /// `{base}/w/index.php?search={topic} {suffix}`
    pub fn search_url(&self, topic: &str) -> Result<Url, FetchError> {
        let mut url = self.base.join("/w/index.php").map_err(|_| FetchError::InvalidUrl { url: self.config.base_url.clone() })?;
        url.query_pairs_mut().append_pair("search", &format!("{} {}", topic, self.config.search_suffix));
        Ok(url)
    }

    async fn crawl_documents(&self, topic: &str, urls: Vec<Url>, run: &Run) -> Vec<Document> {
        let delay = Duration::from_millis(self.config.delay_ms);
        let mut docs = Vec::with_capacity(urls.len());
        for url in urls {
            if run.expired() {
                warn!(topic, collected = docs.len(), "crawl deadline reached; stopping topic");
                break;
            }
            let result = {
                let Ok(_permit) = self.permits.acquire().await else { break };
                self.crawl_document(&url, run).await
            };
            match result {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!(topic, %url, error = %e, "dropping document"),
            }
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
        docs
    }

    /// Result links for one topic, following one "next page" link when the cap
    /// exceeds a single page.
    async fn list_results(&self, topic: &str, cap: usize, run: &Run) -> Result<Vec<Url>, CrawlError> {
        let search_url = self.search_url(topic)?;
        let (mut results, next) = {
            let page = self.fetch_page(&search_url, run).await?;
            (extract::search_results(&page, &search_url), extract::next_page(&page, &search_url))
        };
        results.truncate(cap);
        if cap <= RESULTS_PER_PAGE || results.len() >= cap {
            return Ok(results);
        }
        let remaining = cap - results.len();
        match next {
            Ok(next_url) => match self.fetch_page(&next_url, run).await {
                Ok(page) => results.extend(extract::search_results(&page, &next_url).into_iter().take(remaining)),
                Err(e) => warn!(topic, error = %e, "second results page unavailable"),
            },
            Err(e) => debug!(topic, error = %e, "no further results"),
        }
        Ok(results)
    }

    async fn crawl_document(&self, url: &Url, run: &Run) -> Result<Document, CrawlError> {
        let article = {
            let page = self.fetch_page(url, run).await?;
            extract::article(&page, url)
        };

        let citation = match &article.cite {
            Some(cite_url) => match self.fetch_page(cite_url, run).await {
                Ok(page) => extract::citation(&page, cite_url).unwrap_or_else(|e| {
                    debug!(%url, error = %e, "citation metadata unavailable");
                    Citation::default()
                }),
                Err(e) => {
                    warn!(%url, error = %e, "citation page unavailable");
                    Citation::default()
                }
            },
            None => Citation::default(),
        };

        let revision_history = match &article.history {
            Some(history_url) => match self.fetch_page(history_url, run).await {
                Ok(page) => extract::revision_dates(&page),
                Err(e) => {
                    warn!(%url, error = %e, "history page unavailable");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let title = citation
            .page_name
            .or(article.heading)
            .ok_or_else(|| ParseError::MissingElement { what: "title", url: url.to_string() })?;

        Ok(Document {
            url: url.to_string(),
            title,
            word_count: word_count(&article.text),
            text: article.text,
            categories: article.categories,
            links: article.links,
            references: article.references,
            author_editor: citation.author_editor,
            date_retrieved: citation.date_retrieved,
            last_modification_date: citation.last_modification_date,
            article_id: citation.article_id,
            revision_history,
        })
    }

    /// Fetch with bounded retries on transient failures, exponential backoff,
    /// and the run deadline applied to every attempt.
    async fn fetch_page(&self, url: &Url, run: &Run) -> Result<Html, FetchError> {
        let mut attempt = 0u32;
        loop {
            let err = match timeout_at(run.deadline, self.fetcher.fetch(url)).await {
                Ok(Ok(page)) => return Ok(page),
                Ok(Err(e)) => e,
                Err(_) => return Err(FetchError::DeadlineExceeded { url: url.to_string() }),
            };
            if !err.is_transient() || attempt >= self.config.max_retries {
                return Err(err);
            }
            let pause = backoff(self.config.retry_backoff_ms, attempt);
            attempt += 1;
            debug!(%url, attempt, error = %err, ?pause, "retrying fetch");
            sleep_until(after(Instant::now(), pause).min(run.deadline)).await;
        }
    }
}
