//! Crawler coordinator - main crawl orchestration logic
//!
//! This module walks paginated listings one page at a time:
//! - Fetching page 0 and resolving the listing's page count from it
//! - Fetching the remaining pages at a polite, randomized cadence
//! - Merging per-page entities into one result
//! - Running deep crawls over every series and author of a search

use crate::config::{Config, DelayConfig};
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchResult};
use crate::crawler::throttle::{DelayPolicy, Throttle};
use crate::extract::{parse_author_page, parse_search_page, parse_series_page};
use crate::model::{
    AuthorDetails, AuthorInfo, AuthorPage, Book, BookContext, CrawlResult, DetailedResults,
    ListingKind, PageResult, SeriesDetails, SeriesInfo, SeriesPage,
};
use crate::url::{page_url, Site};
use crate::ScraperError;
use reqwest::Client;
use tracing::{debug, error, info, warn};
use url::Url;

/// A parsed page of some listing
trait Listing {
    /// Page count the page declares for its listing
    fn total_pages(&self) -> u32;

    /// Short description of what the page yielded, for progress logs
    fn summary(&self) -> String;
}

impl Listing for PageResult {
    fn total_pages(&self) -> u32 {
        self.total_pages
    }

    fn summary(&self) -> String {
        format!(
            "{} series, {} authors, {} books",
            self.series.len(),
            self.authors.len(),
            self.books.len()
        )
    }
}

impl Listing for SeriesPage {
    fn total_pages(&self) -> u32 {
        self.total_pages
    }

    fn summary(&self) -> String {
        format!("{} books", self.books.len())
    }
}

impl Listing for AuthorPage {
    fn total_pages(&self) -> u32 {
        self.total_pages
    }

    fn summary(&self) -> String {
        format!("{} books", self.books.len())
    }
}

/// Every successfully fetched page of one listing
struct Pages<P> {
    first: P,
    rest: Vec<P>,
    total_pages: u32,
}

/// Main crawler structure
///
/// Holds the HTTP client and the site; every crawl call owns its own
/// throttle, so one crawler can run any number of crawls in sequence.
pub struct Crawler {
    client: Client,
    site: Site,
    delays: DelayConfig,
}

impl Crawler {
    /// Creates a crawler from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Client built with the configured header profile
    /// * `Err(ScraperError)` - Invalid base URL or header value
    pub fn new(config: &Config) -> Result<Self, ScraperError> {
        let site = Site::new(&config.site.base_url)?;
        let client = build_http_client(&config.http, &site)?;

        Ok(Self {
            client,
            site,
            delays: config.delay.clone(),
        })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Crawls every page of a search query
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text search query
    /// * `max_pages` - Optional cap on the number of pages processed
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Entities of all fetched pages, in page order
    /// * `Err(ScraperError::FatalFetch)` - The first results page could not be
    ///   retrieved
    ///
    /// # Example
    ///
    /// ```no_run
    /// use flibusta_scraper::{Config, Crawler};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::new(&Config::default())?;
    /// let result = crawler.crawl_search("Азимов", Some(3)).await?;
    /// println!("{} books", result.stats.books_count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl_search(
        &self,
        query: &str,
        max_pages: Option<u32>,
    ) -> Result<CrawlResult, ScraperError> {
        let site = &self.site;
        info!("Searching for '{}'", query);

        let pages = self
            .walk_pages(
                |page| Ok(site.search_url(query, page)?),
                |html| parse_search_page(html, site),
                max_pages,
            )
            .await?;

        let mut result = CrawlResult::new(query, pages.total_pages);
        result.absorb(pages.first);
        for page in pages.rest {
            result.absorb(page);
        }

        info!(
            "Search '{}' done: {} series, {} authors, {} books over {} pages",
            query,
            result.stats.series_count,
            result.stats.authors_count,
            result.stats.books_count,
            result.total_pages
        );

        Ok(result)
    }

    /// Crawls every page of a series listing
    pub async fn crawl_series(
        &self,
        url: &str,
        max_pages: Option<u32>,
    ) -> Result<SeriesDetails, ScraperError> {
        let listing = self.listing_url(url)?;
        let listing_str = listing.to_string();
        let site = &self.site;

        let pages = self
            .walk_pages(
                |page| Ok(detail_page_url(&listing, page)),
                |html| parse_series_page(html, site, &listing_str),
                max_pages,
            )
            .await?;

        let series = pages.first.series;
        let context = BookContext {
            kind: ListingKind::Series,
            name: series.name.clone(),
            url: series.url.clone(),
        };
        let books = stamp_books(
            pages
                .rest
                .into_iter()
                .fold(pages.first.books, |mut books, page| {
                    books.extend(page.books);
                    books
                }),
            &context,
        );

        info!(
            "Series '{}': {} books over {} pages",
            series.name,
            books.len(),
            pages.total_pages
        );

        Ok(SeriesDetails {
            series_info: SeriesInfo {
                series,
                total_pages: pages.total_pages,
            },
            books,
        })
    }

    /// Crawls every page of an author listing
    pub async fn crawl_author(
        &self,
        url: &str,
        max_pages: Option<u32>,
    ) -> Result<AuthorDetails, ScraperError> {
        let listing = self.listing_url(url)?;
        let listing_str = listing.to_string();
        let site = &self.site;

        let pages = self
            .walk_pages(
                |page| Ok(detail_page_url(&listing, page)),
                |html| parse_author_page(html, site, &listing_str),
                max_pages,
            )
            .await?;

        let author = pages.first.author;
        let context = BookContext {
            kind: ListingKind::Author,
            name: author.name.clone(),
            url: author.url.clone(),
        };
        let mut books = pages.first.books;
        for page in pages.rest {
            books.extend(page.books);
        }
        let books = stamp_books(books, &context);

        info!(
            "Author '{}': {} books over {} pages",
            author.name,
            books.len(),
            pages.total_pages
        );

        Ok(AuthorDetails {
            author_info: AuthorInfo {
                author,
                total_pages: pages.total_pages,
            },
            books,
        })
    }

    /// Deep crawl: follows every series, then every author, of a search
    ///
    /// Items are paced by the batch cadence. An item whose crawl fails is
    /// logged and left out; the batch always runs to the end.
    pub async fn crawl_details(
        &self,
        result: &CrawlResult,
        max_pages: Option<u32>,
    ) -> DetailedResults {
        let mut batch = Throttle::new(DelayPolicy::batch(&self.delays));
        let mut details = DetailedResults {
            query: result.query.clone(),
            ..DetailedResults::default()
        };

        let series_total = result.series.len();
        for (index, series) in result.series.iter().enumerate() {
            batch.wait().await;
            info!(
                "Processing series {}/{}: {}",
                index + 1,
                series_total,
                series.name
            );
            match self.crawl_series(&series.url, max_pages).await {
                Ok(series_details) => details.series_details.push(series_details),
                Err(e) => warn!("Skipping series {}: {}", series.url, e),
            }
        }

        let authors_total = result.authors.len();
        for (index, author) in result.authors.iter().enumerate() {
            batch.wait().await;
            info!(
                "Processing author {}/{}: {}",
                index + 1,
                authors_total,
                author.name
            );
            match self.crawl_author(&author.url, max_pages).await {
                Ok(author_details) => details.authors_details.push(author_details),
                Err(e) => warn!("Skipping author {}: {}", author.url, e),
            }
        }

        details
    }

    /// Resolves a listing URL, accepting site-relative paths
    fn listing_url(&self, url: &str) -> Result<Url, ScraperError> {
        Ok(self.site.base().join(url)?)
    }

    /// Fetches page 0, resolves the page count, then fetches the rest
    ///
    /// Only a page-0 failure is fatal; later failures are logged and the
    /// page is skipped.
    async fn walk_pages<P, U, F>(
        &self,
        page_url_of: U,
        parse: F,
        max_pages: Option<u32>,
    ) -> Result<Pages<P>, ScraperError>
    where
        P: Listing,
        U: Fn(u32) -> Result<Url, ScraperError>,
        F: Fn(&str) -> P,
    {
        let mut throttle = Throttle::new(DelayPolicy::page(&self.delays));

        let first_url = page_url_of(0)?;
        let body = match fetch_page(&self.client, &mut throttle, first_url.as_str()).await {
            FetchResult::Success { body, .. } => body,
            failure => {
                error!("Could not retrieve {}: {}", first_url, failure);
                return Err(ScraperError::FatalFetch {
                    url: first_url.to_string(),
                    reason: failure.to_string(),
                });
            }
        };

        let first = parse(&body);
        let declared = first.total_pages().max(1);
        let total_pages = match max_pages {
            Some(cap) if cap.max(1) < declared => {
                info!("Listing has {} pages, capped at {}", declared, cap.max(1));
                cap.max(1)
            }
            _ => declared,
        };
        info!("Page 1/{}: {}", total_pages, first.summary());

        let mut rest = Vec::new();
        for page in 1..total_pages {
            let url = page_url_of(page)?;
            match fetch_page(&self.client, &mut throttle, url.as_str()).await {
                FetchResult::Success { body, .. } => {
                    let parsed = parse(&body);
                    info!("Page {}/{}: {}", page + 1, total_pages, parsed.summary());
                    rest.push(parsed);
                }
                failure => {
                    warn!(
                        "Could not retrieve page {}/{} ({}): {}",
                        page + 1,
                        total_pages,
                        url,
                        failure
                    );
                }
            }
        }

        debug!(
            "Fetched {} of {} pages in {} requests",
            rest.len() + 1,
            total_pages,
            throttle.requests()
        );

        Ok(Pages {
            first,
            rest,
            total_pages,
        })
    }
}

/// URL of page `page` of a detail listing; page 0 is the listing itself
fn detail_page_url(listing: &Url, page: u32) -> Url {
    if page == 0 {
        listing.clone()
    } else {
        page_url(listing, page)
    }
}

/// Records the listing every book was discovered under
fn stamp_books(books: Vec<Book>, context: &BookContext) -> Vec<Book> {
    books
        .into_iter()
        .map(|mut book| {
            book.discovered_under = Some(context.clone());
            book
        })
        .collect()
}
