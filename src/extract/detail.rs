//! Series and author page extractors
//!
//! Both page kinds share a heading, a flat run of book lines and a pager.
//! Series pages add a metadata table and co-authors per book; author pages
//! add a genre list.

use crate::extract::siblings::SiblingRun;
use crate::extract::{detail_total_pages, element_text};
use crate::model::{dedup_by_url, Author, AuthorPage, Book, DownloadLink, Genre, Series, SeriesPage};
use crate::url::{CatalogPath, Site};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

/// Text that precedes download links on a book line ("download")
pub const DOWNLOAD_MARKER: &str = "скачать";

fn format_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([^()]*)\)").expect("format token pattern is valid"))
}

/// Extracts the parenthesized format label from download link text
fn format_token(text: &str) -> Option<String> {
    let caps = format_token_pattern().captures(text)?;
    let format = caps[1].trim();
    (!format.is_empty()).then(|| format.to_string())
}

/// Parses one page of a series listing
///
/// # Arguments
///
/// * `html` - Raw markup of the page
/// * `site` - Site origin used to resolve hrefs
/// * `listing_url` - Absolute URL of the series, stored on the record
///
/// # Example
///
/// ```
/// use flibusta_scraper::extract::parse_series_page;
/// use flibusta_scraper::url::Site;
///
/// let html = r#"<h1 class="title">Foundation</h1>
///     <div><img src="/i.gif"> <a href="/b/7">Foundation</a> скачать <a href="/b/7/epub">(epub)</a><br></div>"#;
/// let site = Site::new("https://flibusta.is/").unwrap();
/// let page = parse_series_page(html, &site, "https://flibusta.is/s/1");
/// assert_eq!(page.series.name, "Foundation");
/// assert_eq!(page.books[0].download_links[0].format, "epub");
/// ```
pub fn parse_series_page(html: &str, site: &Site, listing_url: &str) -> SeriesPage {
    let document = Html::parse_document(html);

    let mut series = Series::new(page_title(&document).unwrap_or_default(), listing_url);
    series.attributes = series_attributes(&document);

    SeriesPage {
        series,
        books: collect_books(&document, site, true),
        total_pages: detail_total_pages(&document),
    }
}

/// Parses one page of an author listing
///
/// Author pages carry no per-book co-authors; book author lists are empty.
pub fn parse_author_page(html: &str, site: &Site, listing_url: &str) -> AuthorPage {
    let document = Html::parse_document(html);

    let mut author = Author::new(page_title(&document).unwrap_or_default(), listing_url);
    author.genres = author_genres(&document, site);

    AuthorPage {
        author,
        books: collect_books(&document, site, false),
        total_pages: detail_total_pages(&document),
    }
}

/// Text of the page's primary heading
fn page_title(document: &Html) -> Option<String> {
    for css in ["h1.title", "h1"] {
        let selector = Selector::parse(css).ok()?;
        if let Some(heading) = document.select(&selector).next() {
            return Some(element_text(heading));
        }
    }
    debug!("Page has no heading");
    None
}

/// Label/value rows of the series metadata table
fn series_attributes(document: &Html) -> Option<BTreeMap<String, String>> {
    let table_selector = Selector::parse("table[style]").ok()?;
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td").ok()?;

    let table = document.select(&table_selector).find(|table| {
        table.value().attr("style").is_some_and(|style| {
            let style: String = style.chars().filter(|c| !c.is_whitespace()).collect();
            style.trim_end_matches(';').eq_ignore_ascii_case("width:auto")
        })
    })?;

    let mut attributes = BTreeMap::new();
    for row in table.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() < 2 {
            continue;
        }

        let key = element_text(cells[0]).replace(':', "").trim().to_string();
        if key.is_empty() {
            continue;
        }
        attributes.insert(key, element_text(cells[1]));
    }

    (!attributes.is_empty()).then_some(attributes)
}

/// Genre links listed under the author's name
fn author_genres(document: &Html, site: &Site) -> Option<Vec<Genre>> {
    let block_selector = Selector::parse("p.genre").ok()?;
    let link_selector = Selector::parse("a.genre[href]").ok()?;

    let block = document.select(&block_selector).next()?;
    let genres = block
        .select(&link_selector)
        .filter_map(|link| {
            Some(Genre {
                name: element_text(link),
                url: site.resolve(link.value().attr("href")?)?,
            })
        })
        .collect::<Vec<_>>();

    Some(dedup_by_url(genres, |g| g.url.as_str()))
}

/// Book lines of a detail page
///
/// A link to a book page is a book only when its line opens with an icon;
/// other book links on the page (recommendations, navigation) lack one.
/// Each element holding book links is flattened once, and every book link
/// of that run is read from the same flattened list.
fn collect_books(document: &Html, site: &Site, with_coauthors: bool) -> Vec<Book> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut scanned = HashSet::new();
    let mut books = Vec::new();
    for link in document.select(&selector) {
        let is_book = link
            .value()
            .attr("href")
            .is_some_and(|href| site.classify(href) == Some(CatalogPath::Book));
        if !is_book {
            continue;
        }
        let Some(parent) = link.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if !scanned.insert(parent.id()) {
            continue;
        }

        let run = SiblingRun::of(parent);
        for line in run.link_lines() {
            let Some(href) = line.href() else {
                continue;
            };
            if site.classify(href) != Some(CatalogPath::Book) {
                continue;
            }
            let Some(url) = site.resolve(href) else {
                continue;
            };
            if !line.has_leading_icon() {
                debug!("Skipping book link without icon: {}", url);
                continue;
            }

            let mut book = Book::new(line.text(), url);

            if with_coauthors {
                book.authors = line
                    .trailing_links()
                    .into_iter()
                    .filter(|(href, _)| site.classify(href) == Some(CatalogPath::Author))
                    .filter_map(|(href, name)| Some(Author::new(name, site.resolve(href)?)))
                    .collect();
            }

            book.download_links = line
                .trailing_links_after(DOWNLOAD_MARKER)
                .into_iter()
                .filter_map(|(href, text)| {
                    Some(DownloadLink {
                        format: format_token(text)?,
                        url: site.resolve(href)?,
                    })
                })
                .collect();

            books.push(book);
        }
    }

    dedup_by_url(books, |b| b.url.as_str())
}
