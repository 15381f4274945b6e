//! JSON result files
//!
//! Results are written pretty-printed as UTF-8 with non-ASCII text left
//! unescaped, so Cyrillic titles stay readable in the file.

use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name for the results of a search crawl
///
/// # Examples
///
/// ```
/// use flibusta_scraper::output::search_filename;
///
/// assert_eq!(search_filename("Айзек Азимов"), "flibusta_search_Айзек_Азимов.json");
/// ```
pub fn search_filename(query: &str) -> String {
    format!("flibusta_search_{}.json", filename_stem(query))
}

/// File name for the results of a deep crawl
pub fn detailed_filename(query: &str) -> String {
    format!("flibusta_detailed_{}.json", filename_stem(query))
}

/// Query with whitespace runs and path separators replaced by `_`
fn filename_stem(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_")
}

/// Writes a value as pretty-printed JSON
///
/// # Arguments
///
/// * `path` - Destination file, created or truncated
/// * `value` - Any serializable result
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Writes a value into `directory` under `filename`, returning the full path
pub fn write_json_into<T: Serialize>(directory: &Path, filename: &str, value: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join(filename);
    write_json(&path, value)?;
    Ok(path)
}
