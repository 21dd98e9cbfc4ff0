use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use kagami::url::extract_domain;
///
/// let url = Url::parse("https://Dood.WF/e/abc").unwrap();
/// assert_eq!(extract_domain(&url), Some("dood.wf".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Lowercases a host and strips a leading `www.`
///
/// Mirror domains are frequently served both with and without the `www.`
/// prefix, so host comparisons go through this function first.
pub fn bare_domain(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
