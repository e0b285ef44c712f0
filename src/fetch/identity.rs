//! Browser identity rotation
//!
//! Every request attempt carries a freshly drawn user agent plus the headers a
//! desktop browser would send alongside it. The agent pool is picked once at
//! construction: an external [`AgentSource`] when one is available, otherwise
//! the built-in list.

use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, DNT, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Built-in desktop browser agents
pub const BUILTIN_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
];

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";
const REFERER_VALUE: &str = "https://www.google.com/";

/// Errors raised by an external agent source
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Failed to read user agent list: {0}")]
    Io(#[from] std::io::Error),

    #[error("User agent source is empty")]
    Empty,

    #[error("User agent source unavailable: {0}")]
    Unavailable(String),
}

/// An external supplier of user agent strings
pub trait AgentSource: Send + Sync {
    /// Draws one user agent
    fn random_agent(&self) -> Result<String, IdentityError>;
}

/// User agents loaded from a newline-delimited file
#[derive(Debug, Clone)]
pub struct AgentList {
    agents: Vec<String>,
}

impl AgentList {
    /// Builds a list from raw text, one agent per non-empty line
    ///
    /// Lines starting with `#` are treated as comments.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        let agents: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            // Anything that cannot be sent as a header value is useless here
            .filter(|line| HeaderValue::from_str(line).is_ok())
            .map(str::to_string)
            .collect();

        if agents.is_empty() {
            return Err(IdentityError::Empty);
        }

        Ok(Self { agents })
    }

    /// Loads the list from a file
    pub fn from_file(path: &Path) -> Result<Self, IdentityError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Number of agents in the list
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the list holds no agents
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl AgentSource for AgentList {
    fn random_agent(&self) -> Result<String, IdentityError> {
        self.agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(IdentityError::Empty)
    }
}

/// Which agent pool the rotator draws from
pub enum AgentPool {
    /// An external source, backed by the built-in list when a draw fails
    Enhanced(Box<dyn AgentSource>),
    /// The built-in static list only
    Fallback,
}

impl fmt::Debug for AgentPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enhanced(_) => f.write_str("Enhanced"),
            Self::Fallback => f.write_str("Fallback"),
        }
    }
}

/// Produces browser-like header sets, one per request attempt
#[derive(Debug)]
pub struct IdentityRotator {
    pool: AgentPool,
}

impl Default for IdentityRotator {
    fn default() -> Self {
        Self::fallback()
    }
}

impl IdentityRotator {
    /// Creates a rotator that only uses the built-in agent list
    pub fn fallback() -> Self {
        Self {
            pool: AgentPool::Fallback,
        }
    }

    /// Creates a rotator backed by an external agent source
    pub fn with_source(source: Box<dyn AgentSource>) -> Self {
        Self {
            pool: AgentPool::Enhanced(source),
        }
    }

    /// Creates a rotator from an optional agent list file
    ///
    /// A file that cannot be read or holds no usable agents selects the
    /// fallback pool.
    pub fn from_agents_file(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::fallback();
        };

        match AgentList::from_file(path) {
            Ok(list) => {
                tracing::info!(
                    "Loaded {} user agents from {}",
                    list.len(),
                    path.display()
                );
                Self::with_source(Box::new(list))
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load user agents from {} ({}), using built-in list",
                    path.display(),
                    e
                );
                Self::fallback()
            }
        }
    }

    /// Returns true if an external agent source is in use
    pub fn is_enhanced(&self) -> bool {
        matches!(self.pool, AgentPool::Enhanced(_))
    }

    /// Draws one user agent
    pub fn next_user_agent(&self) -> String {
        if let AgentPool::Enhanced(source) = &self.pool {
            match source.random_agent() {
                Ok(agent) => return agent,
                Err(e) => tracing::debug!("Agent source failed ({}), using built-in list", e),
            }
        }

        builtin_agent().to_string()
    }

    /// Builds the header set for the next request attempt
    pub fn next_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(8);

        let agent = self.next_user_agent();
        let agent_value = HeaderValue::from_str(&agent)
            .unwrap_or_else(|_| HeaderValue::from_static(BUILTIN_USER_AGENTS[0]));

        headers.insert(USER_AGENT, agent_value);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

        headers
    }
}

fn builtin_agent() -> &'static str {
    BUILTIN_USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(BUILTIN_USER_AGENTS[0])
}
