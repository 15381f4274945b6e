//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the browser-like header profile
//! - Single GET requests, paced by the caller's throttle
//! - Error classification into page-level failures
//!
//! Failures are values, not errors. The caller decides whether a failed
//! page ends the crawl (first page) or is skipped (any later page).

use crate::config::HttpConfig;
use crate::crawler::throttle::Throttle;
use crate::url::Site;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER,
};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, broken body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => write!(
                f,
                "HTTP {} from {} ({} bytes)",
                status_code,
                final_url,
                body.len()
            ),
            FetchResult::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            FetchResult::NetworkError { error } => write!(f, "{}", error),
        }
    }
}

/// Builds an HTTP client with the configured header profile
///
/// Every request carries User-Agent, Accept-Language, Accept,
/// `Connection: keep-alive` and a Referer pointing at the site origin. Some
/// catalogue mirrors render differently, or refuse, without them.
///
/// # Arguments
///
/// * `config` - Header values and timeouts
/// * `site` - The catalogue origin, sent as Referer
///
/// # Example
///
/// ```
/// use flibusta_scraper::config::HttpConfig;
/// use flibusta_scraper::crawler::build_http_client;
/// use flibusta_scraper::url::Site;
///
/// let site = Site::new("https://flibusta.is/").unwrap();
/// let client = build_http_client(&HttpConfig::default(), &site).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, site: &Site) -> crate::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(&config.accept_language)?);
    headers.insert(ACCEPT, HeaderValue::from_str(&config.accept)?);
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(REFERER, HeaderValue::from_str(site.base().as_str())?);

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches one page after waiting on the throttle
///
/// No retry is attempted; a timeout is reported like any other network
/// failure.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `throttle` - Pacing for the listing this page belongs to
/// * `url` - The absolute URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_page(client: &Client, throttle: &mut Throttle, url: &str) -> FetchResult {
    throttle.wait().await;
    tracing::debug!("GET {}", url);

    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: format!("Failed to read body: {}", e),
                },
            }
        }
        Err(e) => {
            // Classify error
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            FetchResult::NetworkError { error }
        }
    }
}
