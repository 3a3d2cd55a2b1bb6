use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use wikirank_core::snapshot::read_corpus;
use wikirank_core::{BuildError, Corpus, Document, NoMatchPolicy, RetrievalState};
use wikirank_crawler::{CrawlConfig, Crawler};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Deserialize)]
pub struct SearchForm {
    pub query: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub score: f64,
}

pub type AppState = Arc<RetrievalState>;

/// Where the corpus comes from at startup.
pub enum CorpusSource {
    Crawl(CrawlConfig),
    Snapshot(PathBuf),
}

/// The build phase: acquire the corpus once, then index it. An empty corpus is fatal.
pub async fn build_state(source: CorpusSource, policy: NoMatchPolicy) -> Result<RetrievalState, BuildError> {
    let corpus: Corpus = match source {
        CorpusSource::Crawl(config) => {
            let crawler = Crawler::new(config).map_err(|e| BuildError::Crawl(e.to_string()))?;
            crawler.crawl_configured().await
        }
        CorpusSource::Snapshot(path) => read_corpus(&path)?,
    };
    RetrievalState::build_with(corpus, Default::default(), policy)
}

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler).post(search_form_handler))
        .route("/doc/:position", get(doc_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn run_search(state: &RetrievalState, query: String) -> SearchResponse {
    let start = std::time::Instant::now();
    let results: Vec<SearchHit> = state
        .search(&query)
        .into_iter()
        .map(|r| SearchHit { title: r.document.title.clone(), url: r.document.url.clone(), score: r.score })
        .collect();
    SearchResponse { query, took_s: start.elapsed().as_secs_f64(), total_hits: results.len(), results }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    Json(run_search(&state, params.q))
}

pub async fn search_form_handler(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Json<SearchResponse> {
    Json(run_search(&state, form.query))
}

pub async fn doc_handler(State(state): State<AppState>, Path(position): Path<usize>) -> Result<Json<Document>, StatusCode> {
    state.corpus().get(position).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}
