use url::Url;

/// Returns the root of a URL's origin (`scheme://host[:port]/`)
///
/// Relative links are resolved against this root rather than against the
/// page's own path, so `href="b"` on `https://example.com/a/page` becomes
/// `https://example.com/b`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use harrow::url::origin_root;
///
/// let url = Url::parse("https://example.com:8443/a/b?q=1#top").unwrap();
/// assert_eq!(origin_root(&url).as_str(), "https://example.com:8443/");
/// ```
pub fn origin_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    // Credentials never belong to the origin
    let _ = root.set_username("");
    let _ = root.set_password(None);
    root
}

/// Checks whether two URLs share an origin (scheme, host and port)
///
/// Default ports compare equal to their explicit form, and hosts compare
/// case-insensitively because the URL parser lowercases them.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}
