use serde::Deserialize;

/// Default catalogue origin
pub const DEFAULT_BASE_URL: &str = "https://flibusta.is/";

/// Main configuration structure for the scraper
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the values a browser visiting the catalogue would use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub delay: DelayConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin every relative href is resolved against; also sent as Referer
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Header profile and timeouts for the HTTP client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    pub accept: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept_language: "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,\
                     image/webp,image/apng,*/*;q=0.8"
                .to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Randomized delays between requests (milliseconds)
///
/// The effective delay is `base + uniform[0, jitter)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Base delay between pages of one listing
    #[serde(rename = "page-base-ms")]
    pub page_base_ms: u64,

    #[serde(rename = "page-jitter-ms")]
    pub page_jitter_ms: u64,

    /// Base delay between items of a deep crawl batch
    #[serde(rename = "batch-base-ms")]
    pub batch_base_ms: u64,

    #[serde(rename = "batch-jitter-ms")]
    pub batch_jitter_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            page_base_ms: 1000,
            page_jitter_ms: 2000,
            batch_base_ms: 2000,
            batch_jitter_ms: 3000,
        }
    }
}

impl DelayConfig {
    /// No waiting at all; used by tests against local mock servers
    pub fn none() -> Self {
        Self {
            page_base_ms: 0,
            page_jitter_ms: 0,
            batch_base_ms: 0,
            batch_jitter_ms: 0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the JSON result files are written into
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}
