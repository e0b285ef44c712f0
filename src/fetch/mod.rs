//! Fetch layer: identity rotation, proxy pool and the retrying fetch engine

mod fetcher;
pub mod identity;
pub mod proxy;

pub use fetcher::{
    build_http_client, FetchConfig, FetchRequest, FetchedPage, Fetcher, DEFAULT_MAX_RETRIES,
};
pub use identity::{AgentList, AgentSource, IdentityRotator};
pub use proxy::{parse_proxy_list, ProxyPool};
