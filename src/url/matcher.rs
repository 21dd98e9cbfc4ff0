/// Checks if a domain matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "mixdrop.co" matches only "mixdrop.co"
/// 2. Wildcard match: "*.mixdrop.co" matches the bare domain and any
///    subdomain ("mixdrop.co", "m1.mixdrop.co", "a.b.mixdrop.co")
///
/// Host signatures in the resolver registry use this for their domain form.
///
/// # Examples
///
/// ```
/// use kagami::url::matches_wildcard;
///
/// assert!(matches_wildcard("streamtape.com", "streamtape.com"));
/// assert!(matches_wildcard("*.mixdrop.co", "m1.mixdrop.co"));
/// assert!(!matches_wildcard("*.mixdrop.co", "mixdrop.club"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}
