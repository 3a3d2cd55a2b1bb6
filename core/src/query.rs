//! Query scoring with an adaptive relevance cutoff.
//!
//! A query is normalized exactly like document text, scored against every
//! document, and only documents scoring strictly above 40% of the best score
//! are returned, best first. Ties keep corpus order.

use crate::document::{Corpus, Document};
use crate::index::InvertedIndex;
use crate::tokenizer::normalize;
use serde::Serialize;
use std::cmp::Ordering;

/// Fraction of the top score a document must exceed to be returned.
pub const RELEVANCE_RATIO: f64 = 0.4;

/// What to return when no document scores above zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoMatchPolicy {
    /// Nothing matched, nothing returned.
    #[default]
    Empty,
    /// Return the first top-ranked document anyway.
    BestGuess,
}

#[derive(Debug, Clone, Copy)]
pub struct Ranked<'a> {
    pub document: &'a Document,
    pub score: f64,
}

/// Reduced projection handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit<'a> {
    pub title: &'a str,
    pub url: &'a str,
}

impl<'a> Ranked<'a> {
    pub fn hit(&self) -> SearchHit<'a> { SearchHit { title: &self.document.title, url: &self.document.url } }
}

/// Number of scores strictly above `RELEVANCE_RATIO * max`. Zero for an empty
/// slice or a non-positive maximum unless the policy asks for a best guess.
pub fn relevant_count(scores: &[f64], policy: NoMatchPolicy) -> usize {
    let Some(highest) = scores.iter().copied().reduce(f64::max) else { return 0 };
    if highest <= 0.0 {
        return match policy {
            NoMatchPolicy::Empty => 0,
            NoMatchPolicy::BestGuess => 1,
        };
    }
    let threshold = RELEVANCE_RATIO * highest;
    scores.iter().filter(|&&s| s > threshold).count()
}

/// Positions sorted by score descending; stable, so equal scores keep corpus order.
pub fn rank_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
    order
}

/// Score `query` against every document and keep the relevant top `n`.
pub fn search_ranked<'a>(query: &str, index: &InvertedIndex, corpus: &'a Corpus, policy: NoMatchPolicy) -> Vec<Ranked<'a>> {
    if corpus.is_empty() {
        return Vec::new();
    }
    let terms = normalize(query);
    let scores = index.scores(&terms);
    let n = relevant_count(&scores, policy);
    tracing::debug!(query, terms = terms.len(), relevant = n, "scored query");
    rank_order(&scores)
        .into_iter()
        .take(n)
        .filter_map(|pos| corpus.get(pos).map(|document| Ranked { document, score: scores[pos] }))
        .collect()
}

pub fn search<'a>(query: &str, index: &InvertedIndex, corpus: &'a Corpus) -> Vec<&'a Document> {
    search_ranked(query, index, corpus, NoMatchPolicy::default()).into_iter().map(|r| r.document).collect()
}
