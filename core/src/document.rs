use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// One retrieved article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub title: String,
    /// Paragraph text of the main content container; empty when the page has none.
    pub text: String,
    /// Whitespace-delimited tokens in `text`, counted before normalization.
    pub word_count: usize,
    /// Table-of-contents anchors, lead entry excluded.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub author_editor: Option<String>,
    #[serde(default)]
    pub date_retrieved: Option<String>,
    #[serde(default)]
    pub last_modification_date: Option<String>,
    #[serde(default)]
    pub article_id: Option<String>,
    /// Most recent first, as listed by the source.
    #[serde(default)]
    pub revision_history: Vec<String>,
}

impl Document {
    /// A document with only the fields needed for ranking; `word_count` is derived.
    pub fn new(url: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self { url: url.into(), title: title.into(), word_count: word_count(&text), text, ..Default::default() }
    }
}

pub fn word_count(text: &str) -> usize { text.split_whitespace().count() }

/// Documents of one build run, in crawl order. Positions are the index's doc ids.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self { Self { documents } }

    pub fn documents(&self) -> &[Document] { &self.documents }
}

impl Deref for Corpus {
    type Target = [Document];

    fn deref(&self) -> &[Document] { &self.documents }
}

impl From<Vec<Document>> for Corpus {
    fn from(documents: Vec<Document>) -> Self { Self::new(documents) }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self { Self::new(iter.into_iter().collect()) }
}
