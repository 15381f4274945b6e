//! Output module for crawl results
//!
//! This module handles:
//! - Writing search and deep-crawl results as JSON files
//! - Deriving result filenames from the query
//! - Printing per-type count summaries to the console

mod json;
pub mod stats;

pub use json::{detailed_filename, search_filename, write_json, write_json_into};
pub use stats::{
    format_detailed_summary, format_search_summary, print_detailed_summary, print_search_summary,
};
