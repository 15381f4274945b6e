//! HTML extractors for catalogue pages
//!
//! This module turns the markup of a single page into entities:
//! - Search results: series, authors and books sections
//! - Series pages: series record, metadata table and book lines
//! - Author pages: author record, genres and book lines
//! - Pagination bounds for both listing styles
//!
//! Missing sections are not errors. The site omits a section when it has
//! nothing to show, so an absent heading simply yields an empty list.

mod detail;
mod pagination;
mod search;
mod siblings;

pub use detail::{parse_author_page, parse_series_page, DOWNLOAD_MARKER};
pub use pagination::{detail_total_pages, search_total_pages};
pub use search::{parse_search_page, AUTHORS_MARKER, BOOKS_MARKER, SERIES_MARKER};

use regex::Regex;
use scraper::ElementRef;
use std::sync::OnceLock;

/// Trimmed text content of an element
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// `(<N> книг...)` declared next to series and authors in search results
fn books_count_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\((\d+)\s*книг").expect("books count pattern is valid"))
}

/// Reads a declared book count from free item text
pub(crate) fn declared_books_count(text: &str) -> Option<u32> {
    books_count_pattern()
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}
