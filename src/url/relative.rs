use crate::url::bare_domain;
use url::Url;

/// Resolves an href found on a page to an absolute http(s) URL
///
/// Protocol-relative links (`//host/path`) are upgraded to https, relative
/// links are joined against `base`. `javascript:`, `mailto:`, `data:` and
/// fragment-only links are rejected.
///
/// # Examples
///
/// ```
/// use kagami::url::absolutize;
/// use url::Url;
///
/// let base = Url::parse("https://site.example/anime/x").unwrap();
/// assert_eq!(
///     absolutize("//streamtape.com/e/1", &base).as_deref(),
///     Some("https://streamtape.com/e/1")
/// );
/// assert_eq!(
///     absolutize("/anime/y", &base).as_deref(),
///     Some("https://site.example/anime/y")
/// );
/// ```
pub fn absolutize(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Strips scheme and host from a URL, keeping path, query and fragment
///
/// Entries and units are keyed by this form so the identifier still resolves
/// when a source moves to a new mirror domain. Inputs that are not absolute
/// URLs are returned unchanged.
pub fn url_without_domain(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let mut out = url.path().to_string();
            if let Some(query) = url.query() {
                out.push('?');
                out.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                out.push('#');
                out.push_str(fragment);
            }
            out
        }
        Err(_) => raw.to_string(),
    }
}

/// Identifier form of a link found on `site`
///
/// Links on the same site (ignoring `www.`) become domain-less paths; links
/// to other sites stay absolute.
pub fn identifier_for(absolute: &str, site: &Url) -> String {
    let same_site = match (Url::parse(absolute), site.host_str()) {
        (Ok(link), Some(site_host)) => link
            .host_str()
            .map(|host| bare_domain(host) == bare_domain(site_host))
            .unwrap_or(false),
        _ => false,
    };

    if same_site {
        url_without_domain(absolute)
    } else {
        absolute.to_string()
    }
}

/// Maps an external link on the source's own domain to its identifier
///
/// Returns `None` for links on other domains and for the site root. The
/// result is the domain-less form (leading slash, trailing slash and query
/// kept), so it equals the identifier a listing yields for the same page.
pub fn deep_link_path(base: &Url, link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let base_host = bare_domain(base.host_str()?);
    let link_host = bare_domain(parsed.host_str()?);

    if base_host != link_host || parsed.path().trim_matches('/').is_empty() {
        return None;
    }

    Some(url_without_domain(link))
}
