//! Console summaries of crawl results

use crate::model::{CrawlResult, DetailedResults};

/// Formats the per-type counts of a search crawl
pub fn format_search_summary(result: &CrawlResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Search results: {} ===\n", result.query));
    out.push_str(&format!("  Pages: {}\n", result.total_pages));
    out.push_str(&format!("  Series: {}\n", result.stats.series_count));
    out.push_str(&format!("  Authors: {}\n", result.stats.authors_count));
    out.push_str(&format!("  Books: {}\n", result.stats.books_count));
    out
}

/// Formats the counts of a deep crawl
///
/// Books are counted per listing, so a book found under both a series and
/// an author counts twice.
pub fn format_detailed_summary(details: &DetailedResults) -> String {
    let series_books: usize = details.series_details.iter().map(|s| s.books.len()).sum();
    let author_books: usize = details.authors_details.iter().map(|a| a.books.len()).sum();

    let mut out = String::new();
    out.push_str(&format!("=== Detailed results: {} ===\n", details.query));
    out.push_str(&format!(
        "  Series crawled: {} ({} books)\n",
        details.series_details.len(),
        series_books
    ));
    out.push_str(&format!(
        "  Authors crawled: {} ({} books)\n",
        details.authors_details.len(),
        author_books
    ));
    out
}

pub fn print_search_summary(result: &CrawlResult) {
    print!("{}", format_search_summary(result));
}

pub fn print_detailed_summary(details: &DetailedResults) {
    print!("{}", format_detailed_summary(details));
}
