pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod snapshot;
pub mod state;
pub mod tokenizer;

pub use document::{Corpus, Document};
pub use error::{BuildError, SnapshotError};
pub use index::{Bm25Params, DocId, IndexStats, InvertedIndex, Posting, TermId};
pub use query::{search, NoMatchPolicy, Ranked, SearchHit};
pub use state::RetrievalState;
