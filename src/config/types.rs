use serde::Deserialize;

/// Default public proxy lists, one `host:port` per line
pub const DEFAULT_PROXY_SOURCES: &[&str] = &[
    "https://raw.githubusercontent.com/clarketm/proxy-list/master/proxy-list-raw.txt",
    "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt",
];

/// Main configuration structure for Harrow
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub proxies: ProxyConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default, rename = "selector")]
    pub selectors: Vec<SelectorEntry>,
}

/// Fetch engine behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Base pacing delay between requests (seconds)
    pub delay: f64,

    /// Per-request timeout (seconds)
    pub timeout: u64,

    /// Whether TLS certificates are verified
    #[serde(rename = "verify-tls")]
    pub verify_tls: bool,

    /// Whether requests are routed through the proxy pool
    #[serde(rename = "use-proxies")]
    pub use_proxies: bool,

    /// Attempts per fetch, including the first
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Lower bound of the retry backoff (seconds)
    #[serde(rename = "backoff-min")]
    pub backoff_min: f64,

    /// Upper bound of the retry backoff (seconds)
    #[serde(rename = "backoff-max")]
    pub backoff_max: f64,

    /// Newline-delimited user agent list used instead of the built-in pool
    #[serde(rename = "user-agents-file")]
    pub user_agents_file: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            delay: 1.0,
            timeout: 15,
            verify_tls: true,
            use_proxies: false,
            max_retries: 3,
            backoff_min: 2.0,
            backoff_max: 5.0,
            user_agents_file: None,
        }
    }
}

/// Proxy list sourcing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// URLs returning newline-delimited `host:port` entries
    pub sources: Vec<String>,

    /// Maximum entries taken from each source
    #[serde(rename = "per-source-limit")]
    pub per_source_limit: usize,

    /// Timeout for fetching one source (seconds)
    #[serde(rename = "load-timeout")]
    pub load_timeout: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_PROXY_SOURCES.iter().map(|s| s.to_string()).collect(),
            per_source_limit: 50,
            load_timeout: 5,
        }
    }
}

/// Defaults for breadth-first crawls
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum number of pages dequeued per crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth followed from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Restricts link discovery to elements matching this selector
    #[serde(rename = "link-selector")]
    pub link_selector: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_depth: 2,
            link_selector: None,
        }
    }
}

/// Defaults for batch extraction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of concurrent workers
    #[serde(rename = "max-workers")]
    pub max_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_workers: 5 }
    }
}

/// Defaults for table extraction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Selector matching table elements
    pub selector: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            selector: "table".to_string(),
        }
    }
}

/// One named field of the selector spec
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorEntry {
    /// Output field name
    pub field: String,

    /// CSS selector evaluated against each page
    pub css: String,
}
