//! Crawler module for catalogue listings
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the browser-like header profile
//! - Request pacing with randomized delays
//! - Listing walks over search, series and author pages
//! - Deep crawls over every series and author of a search

mod coordinator;
mod fetcher;
mod throttle;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use throttle::{DelayPolicy, Throttle};
