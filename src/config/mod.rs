//! Configuration module for the scraper
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key has a default, so running without a file is supported.
//!
//! # Example
//!
//! ```no_run
//! use flibusta_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Page delay base: {}ms", config.delay.page_base_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DelayConfig, HttpConfig, OutputConfig, SiteConfig, DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
