//! Catalogue entities and crawl results
//!
//! Entities are plain values built fresh for every parsed page. Field names
//! match the JSON layout written by the output module.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A downloadable format of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    /// Format label such as "fb2" or "epub"
    pub format: String,
    pub url: String,
}

/// A genre an author writes in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub name: String,
    pub url: String,
}

/// An author, either as a search hit or as a reference from a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub url: String,

    /// Book count declared next to the author in search results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books_count: Option<u32>,

    /// Genres listed on the author's own page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<Genre>>,
}

impl Author {
    /// Creates a bare author reference
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            books_count: None,
            genres: None,
        }
    }
}

/// A book series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub books_count: Option<u32>,

    /// Label/value rows from the series metadata table, written as keys of
    /// the series record itself
    #[serde(flatten)]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl Series {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            books_count: None,
            attributes: None,
        }
    }
}

/// Which kind of listing a book was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Series,
    Author,
}

/// The series or author listing a book was discovered under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookContext {
    pub kind: ListingKind,
    pub name: String,
    pub url: String,
}

/// A book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub title: String,

    /// Canonical absolute detail URL; identifies the book
    pub url: String,

    pub authors: Vec<Author>,
    pub download_links: Vec<DownloadLink>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered_under: Option<BookContext>,
}

impl Book {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            authors: Vec::new(),
            download_links: Vec::new(),
            discovered_under: None,
        }
    }
}

/// Entities extracted from one search-results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub series: Vec<Series>,
    pub authors: Vec<Author>,
    pub books: Vec<Book>,

    /// Number of pages in the listing this page belongs to (always >= 1)
    pub total_pages: u32,
}

/// A parsed series page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPage {
    pub series: Series,
    pub books: Vec<Book>,
    pub total_pages: u32,
}

/// A parsed author page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorPage {
    pub author: Author,
    pub books: Vec<Book>,
    pub total_pages: u32,
}

/// Per-entity counts of a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub series_count: usize,
    pub authors_count: usize,
    pub books_count: usize,
}

/// Aggregated result of crawling every page of a search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    pub query: String,
    pub total_pages: u32,
    pub series: Vec<Series>,
    pub authors: Vec<Author>,
    pub books: Vec<Book>,
    pub stats: CrawlStats,
}

impl CrawlResult {
    /// Starts a result from the first page of the listing
    pub fn new(query: impl Into<String>, total_pages: u32) -> Self {
        Self {
            query: query.into(),
            total_pages,
            series: Vec::new(),
            authors: Vec::new(),
            books: Vec::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Appends one page's entities; duplicates across pages are kept
    pub fn absorb(&mut self, page: PageResult) {
        self.series.extend(page.series);
        self.authors.extend(page.authors);
        self.books.extend(page.books);
        self.stats = CrawlStats {
            series_count: self.series.len(),
            authors_count: self.authors.len(),
            books_count: self.books.len(),
        };
    }
}

/// Series record of a detail crawl, with its page count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesInfo {
    #[serde(flatten)]
    pub series: Series,
    pub total_pages: u32,
}

/// Author record of a detail crawl, with its page count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorInfo {
    #[serde(flatten)]
    pub author: Author,
    pub total_pages: u32,
}

/// Every book of one series across all its pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesDetails {
    pub series_info: SeriesInfo,
    pub books: Vec<Book>,
}

/// Every book of one author across all their pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorDetails {
    pub author_info: AuthorInfo,
    pub books: Vec<Book>,
}

/// Result of a deep crawl over every series and author of a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailedResults {
    pub query: String,
    pub series_details: Vec<SeriesDetails>,
    pub authors_details: Vec<AuthorDetails>,
}

/// Drops entities whose URL was already seen, keeping the first occurrence
pub(crate) fn dedup_by_url<T>(items: Vec<T>, url_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(url_of(item).to_string()))
        .collect()
}
