//! Field extraction from search-result, article, citation and history pages.
//!
//! Every function is synchronous and works on an already parsed page. Missing
//! optional elements come back as `Err(ParseError)`, empty collections or
//! `None`; nothing here aborts the enclosing document.

use crate::error::ParseError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

fn sel(css: &str) -> Selector { Selector::parse(css).expect("valid selector") }

fn text_of(el: ElementRef<'_>) -> String { el.text().collect::<String>() }

fn missing(what: &'static str, url: &Url) -> ParseError { ParseError::MissingElement { what, url: url.to_string() } }

fn resolve(page_url: &Url, href: &str) -> Option<Url> { Url::parse(href).or_else(|_| page_url.join(href)).ok() }

/// Candidate article locations listed on a search-results page, in page order.
pub fn search_results(doc: &Html, page_url: &Url) -> Vec<Url> {
    let anchor = sel("a[href]");
    doc.select(&sel("div.mw-search-result-heading"))
        .filter_map(|heading| heading.select(&anchor).next())
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve(page_url, href))
        .collect()
}

/// The "next page" link of a search-results page.
pub fn next_page(doc: &Html, page_url: &Url) -> Result<Url, ParseError> {
    let bar = doc.select(&sel("div.mw-pager-navigation-bar")).next().ok_or_else(|| missing("pager navigation", page_url))?;
    bar.select(&sel("a.mw-nextlink[href]"))
        .next()
        .or_else(|| bar.select(&sel("a[href]")).next())
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve(page_url, href))
        .ok_or_else(|| missing("next page link", page_url))
}

/// Paragraphs of the main content container joined by a space. A container
/// without paragraphs yields an empty string.
pub fn body_text(doc: &Html, page_url: &Url) -> Result<String, ParseError> {
    let container = doc.select(&sel("div.mw-content-ltr.mw-parser-output")).next().ok_or_else(|| missing("content container", page_url))?;
    Ok(container.select(&sel("p")).map(text_of).collect::<Vec<_>>().join(" "))
}

/// Table-of-contents anchors without the `#`, skipping the lead entry.
pub fn categories(doc: &Html) -> Vec<String> {
    let Some(toc) = doc.select(&sel("ul.vector-toc-contents")).next() else { return Vec::new() };
    toc.select(&sel("a.vector-toc-link"))
        .skip(1)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.replace('#', ""))
        .collect()
}

/// Every anchor target on the page, duplicates included.
pub fn links(doc: &Html) -> Vec<String> {
    doc.select(&sel("a[href]")).filter_map(|a| a.value().attr("href")).map(str::to_string).collect()
}

/// Anchor targets marked as external citations.
pub fn references(doc: &Html) -> Vec<String> {
    doc.select(&sel("a.external.text[href]")).filter_map(|a| a.value().attr("href")).map(str::to_string).collect()
}

/// Target of the anchor inside `li#{item_id}` (page actions such as cite or history).
pub fn action_link(doc: &Html, page_url: &Url, item_id: &'static str) -> Result<Url, ParseError> {
    doc.select(&sel(&format!("li#{item_id} a[href]")))
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve(page_url, href))
        .ok_or_else(|| missing(item_id, page_url))
}

/// Display title from the page heading, falling back to `<title>`.
pub fn heading_title(doc: &Html) -> Option<String> {
    ["h1#firstHeading", "title"]
        .iter()
        .filter_map(|css| doc.select(&sel(css)).next())
        .map(|el| text_of(el).trim().to_string())
        .find(|t| !t.is_empty())
}

/// Revision timestamps as displayed, in source order.
pub fn revision_dates(doc: &Html) -> Vec<String> { doc.select(&sel(".mw-changeslist-date")).map(text_of).collect() }

/// Fields recognised on a citation-details page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationField {
    PageName,
    Author,
    DateRetrieved,
    LastRevision,
    PageVersionId,
}

impl CitationField {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Page name" => Some(Self::PageName),
            "Author" => Some(Self::Author),
            "Date retrieved" => Some(Self::DateRetrieved),
            "Date of last revision" => Some(Self::LastRevision),
            "Page Version ID" => Some(Self::PageVersionId),
            _ => None,
        }
    }
}

/// Parsed citation metadata; a fresh value per document, absent fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Citation {
    pub page_name: Option<String>,
    pub author_editor: Option<String>,
    pub date_retrieved: Option<String>,
    pub last_modification_date: Option<String>,
    pub article_id: Option<String>,
}

impl Citation {
    fn set(&mut self, field: CitationField, value: String) {
        let slot = match field {
            CitationField::PageName => &mut self.page_name,
            CitationField::Author => &mut self.author_editor,
            CitationField::DateRetrieved => &mut self.date_retrieved,
            CitationField::LastRevision => &mut self.last_modification_date,
            CitationField::PageVersionId => &mut self.article_id,
        };
        *slot = Some(value);
    }
}

/// `"Label: value"` into a known field. The value is everything after the first `": "`.
pub fn parse_citation_entry(entry: &str) -> Option<(CitationField, String)> {
    let (label, value) = entry.split_once(": ")?;
    let field = CitationField::from_label(label)?;
    let value = value.trim();
    (!value.is_empty()).then(|| (field, value.to_string()))
}

pub fn citation(doc: &Html, page_url: &Url) -> Result<Citation, ParseError> {
    let list = doc.select(&sel("div.plainlinks")).next().ok_or_else(|| missing("citation metadata", page_url))?;
    let mut citation = Citation::default();
    for (field, value) in list.select(&sel("li")).filter_map(|li| parse_citation_entry(&text_of(li))) {
        citation.set(field, value);
    }
    Ok(citation)
}

/// Everything taken from the article page itself.
#[derive(Debug, Clone, Default)]
pub struct ArticlePage {
    pub heading: Option<String>,
    pub text: String,
    pub categories: Vec<String>,
    pub links: Vec<String>,
    pub references: Vec<String>,
    pub cite: Option<Url>,
    pub history: Option<Url>,
}

pub fn article(doc: &Html, page_url: &Url) -> ArticlePage {
    let text = body_text(doc, page_url).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "storing empty text");
        String::new()
    });
    let action = |id| {
        action_link(doc, page_url, id)
            .map_err(|e| tracing::debug!(error = %e, "page action unavailable"))
            .ok()
    };
    ArticlePage {
        heading: heading_title(doc),
        text,
        categories: categories(doc),
        links: links(doc),
        references: references(doc),
        cite: action("t-cite"),
        history: action("ca-history"),
    }
}
