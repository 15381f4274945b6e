//! Page-count resolution for the two listing styles
//!
//! Page indices in links are 0-based. Search results count `max + 1`;
//! detail pages count `last + 2`, one for the 0-based index and one for the
//! page being viewed. Both rules come from how the site renders its pagers.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, warn};

fn search_page_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"booksearch\?page=(\d+)&(?:amp;)?ask=").expect("search page pattern is valid")
    })
}

fn page_param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[?&]page=(\d+)").expect("page parameter pattern is valid"))
}

/// Total pages of a search listing from its raw markup
///
/// Every `booksearch?page=<n>&ask=` reference is collected; the highest
/// index plus one is the page count. Markup without any reference is a
/// single page.
///
/// # Examples
///
/// ```
/// use flibusta_scraper::extract::search_total_pages;
///
/// let html = r#"<a href="/booksearch?page=4&amp;ask=x">5</a>"#;
/// assert_eq!(search_total_pages(html), 5);
/// assert_eq!(search_total_pages("<p>nothing</p>"), 1);
/// ```
pub fn search_total_pages(html: &str) -> u32 {
    search_page_pattern()
        .captures_iter(html)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Total pages of a series or author listing
///
/// | Markup | Result |
/// |--------|--------|
/// | no pager | 1 |
/// | pager with a last-page link to index `i` | `i + 2` |
/// | pager without a usable last-page link | highest visible index + 1, or 1 |
///
/// The last case is logged as a warning.
pub fn detail_total_pages(document: &Html) -> u32 {
    let Some(pager) = find_pager(document) else {
        debug!("No pager found, listing has a single page");
        return 1;
    };

    if let Some(index) = last_page_index(pager) {
        return index.saturating_add(2);
    }

    match highest_visible_index(pager) {
        Some(index) => {
            warn!(
                "Pager has no last-page link, falling back to highest visible page index {}",
                index
            );
            index.saturating_add(1)
        }
        None => {
            warn!("Pager has no usable page links, assuming a single page");
            1
        }
    }
}

/// Finds the pager list, preferring the one inside the item-list block
fn find_pager(document: &Html) -> Option<ElementRef<'_>> {
    for css in ["div.item-list ul.pager", "ul.pager"] {
        let selector = Selector::parse(css).ok()?;
        if let Some(pager) = document.select(&selector).next() {
            return Some(pager);
        }
    }
    None
}

fn page_index(href: &str) -> Option<u32> {
    page_param_pattern()
        .captures(href)
        .and_then(|caps| caps[1].parse().ok())
}

fn last_page_index(pager: ElementRef) -> Option<u32> {
    let selector = Selector::parse("li.pager-last a[href]").ok()?;
    pager
        .select(&selector)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(page_index)
}

fn highest_visible_index(pager: ElementRef) -> Option<u32> {
    let selector = Selector::parse("a[href]").ok()?;
    pager
        .select(&selector)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(page_index)
        .max()
}
