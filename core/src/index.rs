use crate::document::Corpus;
use crate::tokenizer::{normalize, NORMALIZER_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;
/// Position of a document in its [`Corpus`].
pub type DocId = u32;

/// Saturation (`k1`) and length normalization (`b`) for BM25.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 1.5, b: 0.75 } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

/// Read-only BM25 index over a corpus. Rebuilt wholesale; there is no incremental update.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub params: Bm25Params,
    pub normalizer: String,
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub postings: HashMap<TermId, Vec<Posting>>, // postings sorted by doc_id
    pub doc_lens: Vec<u32>,
    pub avg_doc_len: f64,
    pub num_docs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub num_docs: u32,
    pub num_terms: usize,
    pub avg_doc_len: f64,
    pub params: Bm25Params,
    pub normalizer: String,
}

impl InvertedIndex {
    pub fn build(corpus: &Corpus) -> Self { Self::build_with(corpus, Bm25Params::default()) }

    /// Single pass over the corpus: normalize each text, assign term ids, count tf/df.
    pub fn build_with(corpus: &Corpus, params: Bm25Params) -> Self {
        let mut index = InvertedIndex { params, normalizer: NORMALIZER_VERSION.to_string(), ..Default::default() };
        for (doc_id, doc) in corpus.iter().enumerate() {
            index.ingest(doc_id as DocId, &normalize(&doc.text));
        }
        index.num_docs = corpus.len() as u32;
        let total: u64 = index.doc_lens.iter().map(|&l| l as u64).sum();
        index.avg_doc_len = if index.num_docs == 0 { 0.0 } else { total as f64 / index.num_docs as f64 };
        tracing::debug!(num_docs = index.num_docs, num_terms = index.dictionary.len(), avg_doc_len = index.avg_doc_len, "built bm25 index");
        index
    }

    fn ingest(&mut self, doc_id: DocId, terms: &[String]) {
        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for term in terms {
            let next_id = self.dictionary.len() as TermId;
            let tid = *self.dictionary.entry(term.clone()).or_insert(next_id);
            if tid as usize == self.df.len() {
                self.df.push(0);
            }
            *tf_counts.entry(tid).or_insert(0) += 1;
        }
        for (tid, tf) in tf_counts {
            self.df[tid as usize] += 1;
            // Documents arrive in id order, so each list stays sorted.
            self.postings.entry(tid).or_default().push(Posting { doc_id, tf });
        }
        self.doc_lens.push(terms.len() as u32);
    }

    /// `ln(1 + (N - df + 0.5) / (df + 0.5))`; never negative.
    pub fn idf(&self, term_id: TermId) -> f64 {
        let n = self.num_docs as f64;
        let df = self.df.get(term_id as usize).copied().unwrap_or(0) as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// One score per document, aligned with corpus order. Documents sharing no
    /// term with the query score exactly 0. Repeated query terms count each time.
    pub fn scores(&self, query_terms: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0f64; self.num_docs as usize];
        let Bm25Params { k1, b } = self.params;
        for term in query_terms {
            let Some(&tid) = self.dictionary.get(term) else { continue };
            let idf = self.idf(tid);
            for p in self.postings.get(&tid).map(Vec::as_slice).unwrap_or_default() {
                let tf = p.tf as f64;
                // tf > 0 implies a non-empty document, so avg_doc_len > 0 here.
                let len_ratio = self.doc_lens[p.doc_id as usize] as f64 / self.avg_doc_len;
                scores[p.doc_id as usize] += idf * (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * len_ratio));
            }
        }
        scores
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_docs: self.num_docs,
            num_terms: self.dictionary.len(),
            avg_doc_len: self.avg_doc_len,
            params: self.params,
            normalizer: self.normalizer.clone(),
        }
    }
}
