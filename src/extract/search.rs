//! Search-results page extractor
//!
//! The results page has up to three sections, each introduced by a heading
//! text and followed by a `<ul>` of items. A section the site has nothing
//! for is left out entirely.

use crate::extract::{declared_books_count, element_text, search_total_pages};
use crate::model::{dedup_by_url, Author, Book, PageResult, Series};
use crate::url::Site;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Heading text of the series section ("found series")
pub const SERIES_MARKER: &str = "Найденные серии";

/// Heading text of the authors section ("found writers")
pub const AUTHORS_MARKER: &str = "Найденные писатели";

/// Heading text of the books section ("found books")
pub const BOOKS_MARKER: &str = "Найденные книги";

/// Parses one search-results page
///
/// # Arguments
///
/// * `html` - Raw markup of the page
/// * `site` - Site origin used to resolve hrefs
///
/// # Returns
///
/// The page's series, authors and books (each unique by URL) together with
/// the total page count of the search.
///
/// # Example
///
/// ```
/// use flibusta_scraper::extract::parse_search_page;
/// use flibusta_scraper::url::Site;
///
/// let html = r#"<h3>Найденные книги:</h3><ul><li><a href="/b/1">Foundation</a></li></ul>"#;
/// let site = Site::new("https://flibusta.is/").unwrap();
/// let page = parse_search_page(html, &site);
/// assert_eq!(page.books[0].url, "https://flibusta.is/b/1");
/// assert_eq!(page.total_pages, 1);
/// ```
pub fn parse_search_page(html: &str, site: &Site) -> PageResult {
    let document = Html::parse_document(html);

    let series: Vec<Series> = section_items(&document, SERIES_MARKER)
        .into_iter()
        .filter_map(|item| parse_series_item(item, site))
        .collect();

    let authors: Vec<Author> = section_items(&document, AUTHORS_MARKER)
        .into_iter()
        .filter_map(|item| parse_author_item(item, site))
        .collect();

    let books: Vec<Book> = section_items(&document, BOOKS_MARKER)
        .into_iter()
        .filter_map(|item| parse_book_item(item, site))
        .collect();

    PageResult {
        series: dedup_by_url(series, |s| s.url.as_str()),
        authors: dedup_by_url(authors, |a| a.url.as_str()),
        books: dedup_by_url(books, |b| b.url.as_str()),
        total_pages: search_total_pages(html),
    }
}

/// Items of the list that follows the heading containing `marker`
fn section_items<'a>(document: &'a Html, marker: &str) -> Vec<ElementRef<'a>> {
    let Some(list) = find_list_after(document, marker) else {
        debug!("Section '{}' not present on page", marker);
        return Vec::new();
    };

    match Selector::parse("li") {
        Ok(selector) => list.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// First `<ul>` after the text node containing `marker`, in document order
fn find_list_after<'a>(document: &'a Html, marker: &str) -> Option<ElementRef<'a>> {
    let mut marker_seen = false;

    for node in document.tree.root().descendants() {
        if !marker_seen {
            marker_seen = node
                .value()
                .as_text()
                .is_some_and(|text| text.contains(marker));
        } else if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == "ul" {
                return Some(element);
            }
        }
    }

    None
}

/// All links of an item as (text, absolute URL)
fn item_links(item: ElementRef, site: &Site) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    item.select(&selector)
        .filter_map(|link| {
            let url = site.resolve(link.value().attr("href")?)?;
            Some((element_text(link), url))
        })
        .collect()
}

fn parse_series_item(item: ElementRef, site: &Site) -> Option<Series> {
    let (name, url) = item_links(item, site).into_iter().next()?;
    let mut series = Series::new(name, url);
    series.books_count = declared_books_count(&item.text().collect::<String>());
    Some(series)
}

fn parse_author_item(item: ElementRef, site: &Site) -> Option<Author> {
    let (name, url) = item_links(item, site).into_iter().next()?;
    let mut author = Author::new(name, url);
    author.books_count = declared_books_count(&item.text().collect::<String>());
    Some(author)
}

fn parse_book_item(item: ElementRef, site: &Site) -> Option<Book> {
    let mut links = item_links(item, site).into_iter();
    let (title, url) = links.next()?;
    let mut book = Book::new(title, url);
    book.authors = links.map(|(name, url)| Author::new(name, url)).collect();
    Some(book)
}
