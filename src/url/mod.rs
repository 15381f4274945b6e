//! URL handling for the catalogue
//!
//! This module resolves hrefs against the site origin, classifies catalogue
//! paths (book pages, author pages) and builds search and pagination URLs.

use crate::{UrlError, UrlResult};
use url::form_urlencoded::byte_serialize;
use url::Url;

/// The catalogue site every extracted href is resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    base: Url,
}

impl Site {
    /// Creates a site from its origin, e.g. `https://flibusta.is/`
    ///
    /// # Examples
    ///
    /// ```
    /// use flibusta_scraper::url::Site;
    ///
    /// let site = Site::new("https://flibusta.is").unwrap();
    /// assert_eq!(site.resolve("/b/42").unwrap(), "https://flibusta.is/b/42");
    /// ```
    pub fn new(base_url: &str) -> UrlResult<Self> {
        let base = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(UrlError::InvalidScheme(base.scheme().to_string()));
        }

        Ok(Self { base })
    }

    /// The site origin, also used as the Referer header
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves an href to an absolute URL string
    ///
    /// Returns None for hrefs that do not point at a page:
    /// - empty or fragment-only hrefs
    /// - javascript:, mailto:, tel: and data: schemes
    /// - anything that does not resolve to http(s)
    ///
    /// Already-absolute URLs come back unchanged, so resolving twice is a
    /// no-op.
    pub fn resolve(&self, href: &str) -> Option<String> {
        self.resolve_url(href).map(String::from)
    }

    fn resolve_url(&self, href: &str) -> Option<Url> {
        let href = href.trim();

        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        if href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("data:")
        {
            return None;
        }

        match self.base.join(href) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
            _ => None,
        }
    }

    /// Returns the path kind of an href, if it points at a catalogue entity
    pub fn classify(&self, href: &str) -> Option<CatalogPath> {
        let url = self.resolve_url(href)?;
        CatalogPath::from_path(url.path())
    }

    /// Builds the search-results URL for a free-text query
    ///
    /// Each whitespace-separated word is percent-encoded and the words are
    /// joined with `+`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flibusta_scraper::url::Site;
    ///
    /// let site = Site::new("https://flibusta.is/").unwrap();
    /// let url = site.search_url("Айзек Азимов", 2).unwrap();
    /// assert!(url.as_str().starts_with("https://flibusta.is/booksearch?page=2&ask=%D0%90"));
    /// ```
    pub fn search_url(&self, query: &str, page: u32) -> UrlResult<Url> {
        let ask = encode_query(query)?;
        self.base
            .join(&format!("booksearch?page={}&ask={}", page, ask))
            .map_err(|e| UrlError::Parse(e.to_string()))
    }
}

/// Kinds of catalogue paths the extractors care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPath {
    /// `/b/<id>`: a book page
    Book,
    /// `/a/<id>`: an author page
    Author,
}

impl CatalogPath {
    /// Classifies a URL path; download and reader paths below a book
    /// (`/b/<id>/fb2`) are not book pages
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let (kind, id) = if let Some(id) = trimmed.strip_prefix("/b/") {
            (Self::Book, id)
        } else if let Some(id) = trimmed.strip_prefix("/a/") {
            (Self::Author, id)
        } else {
            return None;
        };

        if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
            Some(kind)
        } else {
            None
        }
    }
}

/// Percent-encodes the words of a query and joins them with `+`
pub fn encode_query(query: &str) -> UrlResult<String> {
    let words: Vec<String> = query
        .split_whitespace()
        .map(|word| byte_serialize(word.as_bytes()).collect())
        .collect();

    if words.is_empty() {
        return Err(UrlError::EmptyQuery);
    }

    Ok(words.join("+"))
}

/// Returns the URL of page `page` of a detail listing
///
/// Any existing `page` parameter is replaced; other query parameters are
/// kept.
pub fn page_url(listing: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = listing
        .query_pairs()
        .filter(|(key, _)| *key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = listing.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("page", &page.to_string());
    }
    url
}
