//! Source façade
//!
//! A `Source` binds one source definition to a `Fetcher` and a
//! `HostRegistry` and exposes the catalog operations: listings, search,
//! details, units and media.

mod capabilities;
mod mirrors;

pub use capabilities::{Capabilities, SEARCH_LISTING};
pub use mirrors::extract_mirrors;

use crate::config::{load_config_with_hash, ListingConfig, SourceConfig};
use crate::extract::{has_marker, Extractor, Record};
use crate::fetch::{Document, Fetcher};
use crate::model::{CatalogEntry, MediaDescriptor, MirrorLocator, SearchQuery, Unit};
use crate::paginate::{list_pages, Page, PageRequest, PaginationPolicy};
use crate::resolve::{sort_media, Embed, HostRegistry, MediaPreferences};
use crate::units::UnitLister;
use crate::url::{absolutize, bare_domain, deep_link_path, extract_domain, identifier_for};
use crate::KagamiError;
use futures::stream::Stream;
use std::path::Path;
use url::{form_urlencoded, Url};

/// One configured website
pub struct Source {
    config: SourceConfig,
    base_url: Url,
    fetcher: Fetcher,
    registry: HostRegistry,
    preferences: MediaPreferences,
    capabilities: Capabilities,
}

impl Source {
    /// Creates a source with the built-in host resolvers
    pub fn new(config: SourceConfig) -> Result<Self, KagamiError> {
        Self::with_registry(config, HostRegistry::with_builtin_hosts())
    }

    /// Creates a source resolving embeds through `registry`
    pub fn with_registry(config: SourceConfig, registry: HostRegistry) -> Result<Self, KagamiError> {
        let base_url = Url::parse(&config.source.base_url)?;
        let fetcher = Fetcher::new(&config.source, &config.headers)?;
        let preferences = MediaPreferences::from(&config.preferences);
        let hosts = registry.host_names().into_iter().map(String::from).collect();
        let capabilities = Capabilities::from_config(&config, hosts);

        Ok(Self {
            config,
            base_url,
            fetcher,
            registry,
            preferences,
            capabilities,
        })
    }

    /// Loads a source definition file
    pub fn from_path(path: &Path) -> Result<Self, KagamiError> {
        let (config, hash) = load_config_with_hash(path)?;
        tracing::info!(
            "Loaded source '{}' from {} (config hash: {})",
            config.source.name,
            path.display(),
            hash
        );
        Self::new(config)
    }

    pub fn name(&self) -> &str {
        &self.config.source.name
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn preferences(&self) -> &MediaPreferences {
        &self.preferences
    }

    /// Replaces the preferences used to order resolved media
    pub fn set_preferences(&mut self, preferences: MediaPreferences) {
        self.preferences = preferences;
    }

    /// Absolute URL for an identifier or locator
    ///
    /// Domain-less identifiers are joined with the base URL; absolute
    /// http(s) URLs are returned unchanged.
    pub fn absolute_url(&self, locator: &str) -> Result<String, KagamiError> {
        if let Ok(url) = Url::parse(locator) {
            if url.scheme() == "http" || url.scheme() == "https" {
                return Ok(url.to_string());
            }
        }
        Ok(self.base_url.join(locator.trim())?.to_string())
    }

    /// Maps an external link on this source's domain to a deep-link query
    pub fn deep_link_query(&self, link: &str) -> Option<SearchQuery> {
        deep_link_path(&self.base_url, link).map(SearchQuery::Path)
    }

    /// Lazily pages through a named listing ("popular", "latest", ...)
    ///
    /// Nothing is fetched until the stream is polled; every call starts
    /// again from page 1.
    pub fn listing(
        &self,
        name: &str,
    ) -> Result<impl Stream<Item = Result<Vec<CatalogEntry>, KagamiError>> + '_, KagamiError> {
        let listing = self.find_listing(name)?;
        Ok(self.listing_pages(listing))
    }

    /// Fetches one page of search results
    ///
    /// A `Path` query is a deep link: the detail page is fetched directly and
    /// returned as the only entry.
    pub async fn search(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<Page<CatalogEntry>, KagamiError> {
        if let SearchQuery::Path(path) = query {
            let entry = self.details(path).await?;
            return Ok(Page::new(vec![entry], false));
        }

        if !self.capabilities.search {
            return Err(KagamiError::Unsupported {
                capability: "search".to_string(),
            });
        }
        let listing = self.find_listing(SEARCH_LISTING)?;
        self.fetch_listing_page(listing, page.max(1), Some(query))
            .await
    }

    /// Fetches and extracts the detail page of an entry
    ///
    /// The returned entry carries the identifier it was requested with (in
    /// domain-less form), so identifiers from listings round-trip.
    pub async fn details(&self, identifier: &str) -> Result<CatalogEntry, KagamiError> {
        let url = self.absolute_url(identifier)?;
        let document = self.fetcher.fetch(&url).await?;

        let record = Extractor::new(&self.config.details.fields).extract(&document)?;
        let title = record
            .text("title")
            .ok_or_else(|| KagamiError::RequiredFieldMissing {
                field: "title".to_string(),
                url: url.clone(),
            })?
            .to_string();

        let mut entry = CatalogEntry::new(identifier_for(&url, &self.base_url), title);
        fill_entry(&mut entry, &record, &document.url);
        Ok(entry)
    }

    /// Lists every unit of an entry
    pub async fn units(&self, identifier: &str) -> Result<Vec<Unit>, KagamiError> {
        let url = self.absolute_url(identifier)?;
        UnitLister::new(
            &self.fetcher,
            &self.config.units,
            self.config.source.max_concurrency,
        )
        .list(&url)
        .await
    }

    /// Resolves a unit locator into playable media, best match first
    ///
    /// Accepts a packed `MirrorLocator`, a unit page (mirrors read with the
    /// `[media]` rules) or an embed URL on a known host. Mirrors are
    /// resolved concurrently; failing or unknown mirrors contribute nothing.
    pub async fn media(&self, locator: &str) -> Result<Vec<MediaDescriptor>, KagamiError> {
        let embeds = self.embeds_for(locator).await?;
        if embeds.is_empty() {
            tracing::debug!("No mirrors found for {}", locator);
            return Ok(Vec::new());
        }

        tracing::debug!("Resolving {} mirrors for {}", embeds.len(), locator);
        let mut media = self
            .registry
            .resolve_all(&self.fetcher, &embeds, self.config.source.max_concurrency)
            .await;
        sort_media(&mut media, &self.preferences);
        Ok(media)
    }

    /// Convenience wrapper over `media` for a listed unit
    pub async fn unit_media(&self, unit: &Unit) -> Result<Vec<MediaDescriptor>, KagamiError> {
        self.media(&unit.locator).await
    }

    async fn embeds_for(&self, locator: &str) -> Result<Vec<Embed>, KagamiError> {
        if let Some(packed) = MirrorLocator::decode(locator) {
            return Ok(packed
                .mirrors
                .iter()
                .filter_map(|mirror| {
                    absolutize(&mirror.url, &self.base_url)
                        .map(|url| Embed::new(url).with_language(mirror.lang.clone()))
                })
                .collect());
        }

        let url = self.absolute_url(locator)?;
        if !self.is_own_site(&url) && self.registry.find(&url).is_some() {
            return Ok(vec![Embed::new(url)]);
        }

        let media = self
            .config
            .media
            .as_ref()
            .ok_or_else(|| KagamiError::Unsupported {
                capability: "media".to_string(),
            })?;
        let document = self.fetcher.fetch(&url).await?;
        extract_mirrors(&document, media)
    }

    fn is_own_site(&self, url: &str) -> bool {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| extract_domain(&u))
            .map(|h| bare_domain(&h));
        let own = extract_domain(&self.base_url).map(|h| bare_domain(&h));
        host.is_some() && host == own
    }

    fn find_listing(&self, name: &str) -> Result<&ListingConfig, KagamiError> {
        self.config
            .listings
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| KagamiError::UnknownListing(name.to_string()))
    }

    fn listing_pages<'a>(
        &'a self,
        listing: &'a ListingConfig,
    ) -> impl Stream<Item = Result<Vec<CatalogEntry>, KagamiError>> + 'a {
        let policy = PaginationPolicy {
            max_pages: listing.max_pages,
            dedupe: listing.dedupe,
        };

        list_pages(policy, move |request: PageRequest| async move {
            self.fetch_listing_page(listing, request.index, None).await
        })
    }

    async fn fetch_listing_page(
        &self,
        listing: &ListingConfig,
        page: u32,
        query: Option<&SearchQuery>,
    ) -> Result<Page<CatalogEntry>, KagamiError> {
        let url = self.listing_url(listing, page, query)?;
        let document = self.fetcher.fetch(&url).await?;
        self.parse_listing(listing, &document)
    }

    /// Expands `{page}` / `{query}` and appends filter parameters
    fn listing_url(
        &self,
        listing: &ListingConfig,
        page: u32,
        query: Option<&SearchQuery>,
    ) -> Result<String, KagamiError> {
        let text = query.map(SearchQuery::text).unwrap_or_default();
        let encoded: String = form_urlencoded::byte_serialize(text.as_bytes()).collect();
        let raw = listing
            .url
            .replace("{page}", &page.to_string())
            .replace("{query}", &encoded);

        let mut url = self.base_url.join(&raw)?;
        let params = query.map(SearchQuery::to_params).unwrap_or_default();
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url.to_string())
    }

    fn parse_listing(
        &self,
        listing: &ListingConfig,
        document: &Document,
    ) -> Result<Page<CatalogEntry>, KagamiError> {
        let records = Extractor::new(&listing.fields).extract_items(document, &listing.item_selector)?;

        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(entry) = self.entry_from_record(record, &document.url)? {
                entries.push(entry);
            }
        }

        let has_next = match &listing.next_page_selector {
            Some(marker) => has_marker(document, marker)?,
            None => !entries.is_empty(),
        };

        Ok(Page::new(entries, has_next))
    }

    /// Builds an entry from one listing item
    ///
    /// A matched item without `url` or `title` means the page layout changed
    /// and fails the whole page. Links that cannot be made absolute
    /// (`#`, `javascript:`) are skipped.
    fn entry_from_record(
        &self,
        record: &Record,
        page_url: &Url,
    ) -> Result<Option<CatalogEntry>, KagamiError> {
        let missing = |field: &str| KagamiError::RequiredFieldMissing {
            field: field.to_string(),
            url: page_url.to_string(),
        };
        let href = record.text("url").ok_or_else(|| missing("url"))?;
        let title = record.text("title").ok_or_else(|| missing("title"))?;

        let Some(absolute) = absolutize(href, page_url) else {
            tracing::debug!("Skipping listing item with unusable link '{}'", href);
            return Ok(None);
        };

        let mut entry = CatalogEntry::new(identifier_for(&absolute, &self.base_url), title);
        fill_entry(&mut entry, record, page_url);
        Ok(Some(entry))
    }
}

/// Copies the optional fields of a record onto an entry
fn fill_entry(entry: &mut CatalogEntry, record: &Record, page_url: &Url) {
    entry.thumbnail_url = record
        .text("thumbnail")
        .and_then(|src| absolutize(src, page_url));
    entry.status = record.status("status");
    entry.synopsis = record.text("synopsis").map(str::to_string);
    entry.tags = record.list("tags").into_iter().collect();
}
