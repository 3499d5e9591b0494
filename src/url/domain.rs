use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use seo_auditor::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when `candidate` shares scheme, host and port with `origin`
///
/// Links are resolved against the page they appear on before this check, so
/// a relative href always ends up on the page's own origin.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use seo_auditor::url::is_same_origin;
///
/// let start = Url::parse("https://example.com/").unwrap();
/// assert!(is_same_origin(&start, &Url::parse("https://example.com/about").unwrap()));
/// assert!(!is_same_origin(&start, &Url::parse("https://other.com/").unwrap()));
/// ```
pub fn is_same_origin(origin: &Url, candidate: &Url) -> bool {
    origin.scheme() == candidate.scheme()
        && extract_domain(origin) == extract_domain(candidate)
        && origin.port_or_known_default() == candidate.port_or_known_default()
}

/// Returns the `scheme://host[:port]` base of a URL
pub fn origin_base(url: &Url) -> String {
    url.origin().ascii_serialization()
}
