use crate::fetch::Fetcher;
use crate::model::MediaDescriptor;
use crate::resolve::hosts;
use crate::resolve::{Embed, HostResolver};
use crate::url::{bare_domain, matches_wildcard};
use crate::KagamiError;
use futures::stream::{self, StreamExt};
use regex::Regex;
use std::sync::Arc;
use url::Url;

/// Predicate identifying a hosting service from an embed URL
#[derive(Debug, Clone)]
pub enum HostSignature {
    /// Host pattern, exact or `*.domain` wildcard, compared without `www.`
    Domain(String),
    /// Case-insensitive substring of the full URL
    Substring(String),
    /// Regex over the full URL
    Pattern(Regex),
}

impl HostSignature {
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Domain(pattern) => Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(bare_domain))
                .map(|host| matches_wildcard(pattern, &host))
                .unwrap_or(false),
            Self::Substring(needle) => url.to_lowercase().contains(&needle.to_lowercase()),
            Self::Pattern(regex) => regex.is_match(url),
        }
    }
}

struct RegisteredHost {
    signatures: Vec<HostSignature>,
    resolver: Arc<dyn HostResolver>,
}

/// Ordered table of host resolvers; the first matching signature wins
#[derive(Clone, Default)]
pub struct HostRegistry {
    hosts: Vec<Arc<RegisteredHost>>,
}

impl HostRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in hosts
    ///
    /// Order: doodstream, streamtape, mixdrop, filemoon / packed jwplayer
    /// players, direct media files.
    pub fn with_builtin_hosts() -> Self {
        let mut registry = Self::new();
        hosts::register_builtin(&mut registry);
        registry
    }

    /// Appends a resolver; earlier registrations take precedence
    pub fn register<R>(&mut self, signatures: Vec<HostSignature>, resolver: R) -> &mut Self
    where
        R: HostResolver + 'static,
    {
        self.hosts.push(Arc::new(RegisteredHost {
            signatures,
            resolver: Arc::new(resolver),
        }));
        self
    }

    /// Names of registered hosts, in match order
    pub fn host_names(&self) -> Vec<&str> {
        self.hosts.iter().map(|h| h.resolver.name()).collect()
    }

    /// Finds the resolver for an embed URL
    pub fn find(&self, url: &str) -> Option<&dyn HostResolver> {
        self.hosts
            .iter()
            .find(|host| host.signatures.iter().any(|s| s.matches(url)))
            .map(|host| host.resolver.as_ref())
    }

    /// Resolves a single embed
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<MediaDescriptor>)` - Descriptors from the matching host
    /// * `Err(KagamiError::UnsupportedHost)` - No signature matched
    /// * `Err(KagamiError)` - The host's fetch or decode failed
    pub async fn resolve_one(
        &self,
        fetcher: &Fetcher,
        embed: &Embed,
    ) -> Result<Vec<MediaDescriptor>, KagamiError> {
        let resolver = self.find(&embed.url).ok_or_else(|| KagamiError::UnsupportedHost {
            url: embed.url.clone(),
        })?;

        tracing::debug!("Resolving {} with {}", embed.url, resolver.name());
        resolver.resolve(fetcher, embed).await
    }

    /// Resolves every embed independently and concatenates the results
    ///
    /// At most `max_concurrency` embeds are in flight. Results keep the
    /// order of `embeds`. Unknown hosts and failing mirrors contribute
    /// nothing; this never fails.
    pub async fn resolve_all(
        &self,
        fetcher: &Fetcher,
        embeds: &[Embed],
        max_concurrency: usize,
    ) -> Vec<MediaDescriptor> {
        let results: Vec<Vec<MediaDescriptor>> = stream::iter(embeds)
            .map(|embed| async move {
                match self.resolve_one(fetcher, embed).await {
                    Ok(media) => media,
                    Err(KagamiError::UnsupportedHost { url }) => {
                        tracing::debug!("No resolver for {}, skipping", url);
                        Vec::new()
                    }
                    Err(e) => {
                        tracing::warn!("Mirror {} failed: {}", embed.url, e);
                        Vec::new()
                    }
                }
            })
            .buffered(max_concurrency.max(1))
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}
