use crate::document::Corpus;
use crate::error::BuildError;
use crate::index::{Bm25Params, IndexStats, InvertedIndex};
use crate::query::{search_ranked, NoMatchPolicy, Ranked};

/// Corpus and index built once at startup and only read afterwards.
/// Share it behind an `Arc`; queries need no locking.
#[derive(Debug)]
pub struct RetrievalState {
    corpus: Corpus,
    index: InvertedIndex,
    policy: NoMatchPolicy,
}

impl RetrievalState {
    pub fn build(corpus: Corpus) -> Result<Self, BuildError> { Self::build_with(corpus, Bm25Params::default(), NoMatchPolicy::default()) }

    /// Fails only when there is nothing to index, since no query could ever succeed.
    pub fn build_with(corpus: Corpus, params: Bm25Params, policy: NoMatchPolicy) -> Result<Self, BuildError> {
        if corpus.is_empty() {
            return Err(BuildError::EmptyCorpus);
        }
        let index = InvertedIndex::build_with(&corpus, params);
        tracing::info!(num_docs = index.num_docs, num_terms = index.dictionary.len(), "retrieval state ready");
        Ok(Self { corpus, index, policy })
    }

    pub fn search(&self, query: &str) -> Vec<Ranked<'_>> { search_ranked(query, &self.index, &self.corpus, self.policy) }

    pub fn corpus(&self) -> &Corpus { &self.corpus }

    pub fn stats(&self) -> IndexStats { self.index.stats() }
}
