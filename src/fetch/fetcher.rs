//! HTTP fetch engine
//!
//! This module handles all HTTP requests, including:
//! - Building the shared HTTP client (and one client per proxy in use)
//! - Rotating browser identity headers on every attempt
//! - Routing attempts through a random proxy when enabled
//! - Bounded retries with jittered backoff and proxy eviction
//! - Jittered pacing after every successful request

use crate::config::FetcherConfig;
use crate::fetch::identity::IdentityRotator;
use crate::fetch::proxy::ProxyPool;
use crate::FetchError;
use rand::Rng;
use reqwest::{Client, Method, Proxy, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Attempts per fetch when the caller does not say otherwise
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Length at which error messages are cut in retry logs
const LOG_ERROR_CHARS: usize = 80;

/// Fetch engine settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Base pacing delay after a successful request
    pub delay: Duration,

    /// Per-request timeout
    pub timeout: Duration,

    /// Whether TLS certificates are verified
    pub verify_tls: bool,

    /// Whether attempts go through the proxy pool
    pub use_proxies: bool,

    /// Attempts per fetch, including the first
    pub max_retries: u32,

    /// Lower bound of the backoff after a failed attempt
    pub backoff_min: Duration,

    /// Upper bound of the backoff after a failed attempt
    pub backoff_max: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
            verify_tls: true,
            use_proxies: false,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_min: Duration::from_secs(2),
            backoff_max: Duration::from_secs(5),
        }
    }
}

impl From<&FetcherConfig> for FetchConfig {
    fn from(config: &FetcherConfig) -> Self {
        Self {
            delay: seconds(config.delay),
            timeout: Duration::from_secs(config.timeout),
            verify_tls: config.verify_tls,
            use_proxies: config.use_proxies,
            max_retries: config.max_retries,
            backoff_min: seconds(config.backoff_min),
            backoff_max: seconds(config.backoff_max),
        }
    }
}

/// Converts fractional seconds, clamping negative, NaN and overflowing input
fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

/// One request to be fetched
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub max_retries: Option<u32>,
    pub body: Option<String>,
    pub json: Option<serde_json::Value>,
    pub query: Vec<(String, String)>,
}

impl FetchRequest {
    /// Creates a request with the given method
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            max_retries: None,
            body: None,
            json: None,
            query: Vec::new(),
        }
    }

    /// Creates a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST request with a body
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    /// Overrides the engine's attempt limit for this request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the request body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sends `value` as a JSON body with an `application/json` content type
    ///
    /// Takes precedence over a raw body set with [`FetchRequest::with_body`].
    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.json = Some(value);
        self
    }

    /// Appends a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,

    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, empty if absent
    pub content_type: String,

    /// Page body content
    pub body: String,
}

/// Why a single attempt failed
#[derive(Debug)]
enum AttemptError {
    Timeout,
    Network(reqwest::Error),
    Status(StatusCode),
    Body(reqwest::Error),
    Client(reqwest::Error),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timeout"),
            Self::Network(e) => write!(f, "network error: {}", e),
            Self::Status(status) => write!(f, "HTTP {}", status.as_u16()),
            Self::Body(e) => write!(f, "failed to read body: {}", e),
            Self::Client(e) => write!(f, "failed to build proxy client: {}", e),
        }
    }
}

/// Retrying, identity-rotating HTTP fetcher
///
/// One instance owns the persistent client, the identity rotator and the
/// proxy pool for a run. Share it between workers through an `Arc`.
pub struct Fetcher {
    client: Client,
    proxy_clients: Mutex<HashMap<String, Client>>,
    rotator: IdentityRotator,
    proxies: Arc<ProxyPool>,
    config: FetchConfig,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("rotator", &self.rotator)
            .field("proxies", &self.proxies.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Builds an HTTP client with the engine's settings
///
/// # Arguments
///
/// * `config` - The fetch engine configuration
/// * `proxy` - Optional `host:port` every request is routed through
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .danger_accept_invalid_certs(!config.verify_tls)
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(format!("http://{}", proxy))?);
    }

    builder.build()
}

impl Fetcher {
    /// Creates a fetcher with the built-in identity pool and an empty proxy pool
    pub fn new(config: FetchConfig) -> Result<Self, reqwest::Error> {
        Self::with_parts(config, IdentityRotator::fallback(), Arc::new(ProxyPool::default()))
    }

    /// Creates a fetcher from its collaborators
    pub fn with_parts(
        config: FetchConfig,
        rotator: IdentityRotator,
        proxies: Arc<ProxyPool>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config, None)?;

        Ok(Self {
            client,
            proxy_clients: Mutex::new(HashMap::new()),
            rotator,
            proxies,
            config,
        })
    }

    /// Creates a fetcher from the `[fetcher]` and `[proxies]` config sections
    ///
    /// Proxy sources are not fetched here; call [`Fetcher::load_proxies`].
    pub fn from_config(config: &crate::Config) -> Result<Self, reqwest::Error> {
        let rotator =
            IdentityRotator::from_agents_file(config.fetcher.user_agents_file.as_deref().map(Path::new));
        let proxies = ProxyPool::new(
            config.proxies.per_source_limit,
            Duration::from_secs(config.proxies.load_timeout),
        );

        Self::with_parts(FetchConfig::from(&config.fetcher), rotator, Arc::new(proxies))
    }

    /// Fills the proxy pool from the given source lists
    pub async fn load_proxies(&self, sources: &[String]) -> usize {
        self.proxies.load(&self.client, sources).await
    }

    /// The proxy pool shared by all attempts
    pub fn proxy_pool(&self) -> &Arc<ProxyPool> {
        &self.proxies
    }

    /// The engine settings
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches a URL with GET
    pub async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.fetch(&FetchRequest::get(url)).await
    }

    /// Fetches a request with retries
    ///
    /// # Retry Logic
    ///
    /// Every attempt rotates identity headers and, when proxies are enabled,
    /// draws a random proxy. Network errors, timeouts and non-2xx statuses
    /// are retried after a backoff drawn from `[backoff_min, backoff_max]`;
    /// the proxy used by a failed attempt is evicted from the pool. A
    /// successful response is followed by a pacing sleep drawn from
    /// `[0.5 × delay, 1.5 × delay]`.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - A 2xx response and its body
    /// * `Err(FetchError)` - The URL was invalid or every attempt failed
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let url = Url::parse(&request.url).map_err(|e| FetchError::InvalidUrl {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let max_retries = request.max_retries.unwrap_or(self.config.max_retries).max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_retries {
            let proxy = if self.config.use_proxies {
                self.proxies.random()
            } else {
                None
            };

            match self.attempt(&url, request, proxy.as_deref()).await {
                Ok(page) => {
                    tokio::time::sleep(self.pacing_delay()).await;
                    return Ok(page);
                }
                Err(e) => {
                    last_error = e.to_string();
                    tracing::warn!(
                        "Error fetching {}: {}. Attempt {}/{}",
                        request.url,
                        truncate(&last_error, LOG_ERROR_CHARS),
                        attempt,
                        max_retries
                    );

                    if let Some(proxy) = proxy.as_deref() {
                        self.evict_proxy(proxy);
                    }

                    tokio::time::sleep(self.backoff_delay()).await;
                }
            }
        }

        tracing::error!(
            "Could not fetch {} after {} attempts",
            request.url,
            max_retries
        );

        Err(FetchError::Exhausted {
            url: request.url.clone(),
            attempts: max_retries,
            last_error,
        })
    }

    /// Issues a single attempt
    async fn attempt(
        &self,
        url: &Url,
        request: &FetchRequest,
        proxy: Option<&str>,
    ) -> Result<FetchedPage, AttemptError> {
        let client = match proxy {
            Some(proxy) => self.client_for_proxy(proxy)?,
            None => self.client.clone(),
        };

        let mut builder = client
            .request(request.method.clone(), url.clone())
            .headers(self.rotator.next_headers())
            .timeout(self.config.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(json) = &request.json {
            builder = builder.json(json);
        } else if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        tracing::debug!(
            "{} {} via {}",
            request.method,
            url,
            proxy.unwrap_or("direct connection")
        );

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Timeout
            } else {
                AttemptError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Timeout
            } else {
                AttemptError::Body(e)
            }
        })?;

        Ok(FetchedPage {
            url: request.url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    /// Returns the cached client for a proxy, building it on first use
    fn client_for_proxy(&self, proxy: &str) -> Result<Client, AttemptError> {
        let mut clients = self.proxy_clients.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(client) = clients.get(proxy) {
            return Ok(client.clone());
        }

        let client = build_http_client(&self.config, Some(proxy)).map_err(AttemptError::Client)?;
        clients.insert(proxy.to_string(), client.clone());
        Ok(client)
    }

    /// Drops a failed proxy from the pool and the client cache
    fn evict_proxy(&self, proxy: &str) {
        if self.proxies.evict(proxy) {
            tracing::info!(
                "Evicted proxy {} ({} remaining)",
                proxy,
                self.proxies.len()
            );
        }

        self.proxy_clients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(proxy);
    }

    fn pacing_delay(&self) -> Duration {
        let base = self.config.delay.as_secs_f64();
        jittered(base * 0.5, base * 1.5)
    }

    fn backoff_delay(&self) -> Duration {
        jittered(
            self.config.backoff_min.as_secs_f64(),
            self.config.backoff_max.as_secs_f64(),
        )
    }
}

/// Draws a duration uniformly from `[low, high]` seconds
fn jittered(low: f64, high: f64) -> Duration {
    if high <= low {
        return Duration::from_secs_f64(low.max(0.0));
    }
    Duration::from_secs_f64(rand::thread_rng().gen_range(low..=high))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
