use crate::UrlError;
use url::{form_urlencoded, Url};

/// Query parameters that only carry campaign attribution
///
/// Any `utm_*` key is dropped as well.
const ATTRIBUTION_PARAMS: &[&str] = &["fbclid", "gclid", "dclid", "msclkid", "mc_eid", "mc_cid"];

/// Canonical form of a page address
///
/// Two links that point at the same page normalize to the same URL, which is
/// what the crawl's visited set and the deduplication reply matching key on.
///
/// - only `http` and `https` are accepted, and a host is required
/// - the host is lowercased; scheme, `www.` and port are kept as they are
/// - dot segments, empty segments and a trailing slash are removed
/// - the fragment is dropped
/// - attribution parameters are dropped and the rest sorted by key
///
/// ```
/// use seo_auditor::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM/hotels/paris/?utm_source=x#map").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/hotels/paris");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlError::MissingDomain)?
        .to_ascii_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("{}: {}", host, e)))?;

    let path = canonical_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    let query = canonical_query(&url);
    url.set_query(query.as_deref());

    Ok(url)
}

fn canonical_path(path: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if segment == ".." {
            kept.pop();
        } else {
            kept.push(segment);
        }
    }
    format!("/{}", kept.join("/"))
}

/// Sorted query string without attribution parameters, or `None` if empty
fn canonical_query(url: &Url) -> Option<String> {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !key.starts_with("utm_") && !ATTRIBUTION_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if pairs.is_empty() {
        return None;
    }

    pairs.sort();

    // Pairs come back decoded and must be re-encoded, or `a%26b` splits in two
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        if value.is_empty() {
            query.append_key_only(key);
        } else {
            query.append_pair(key, value);
        }
    }
    Some(query.finish())
}
