use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete description of one source website
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub source: SourceInfo,
    #[serde(default)]
    pub headers: HeadersConfig,
    #[serde(default, rename = "listing")]
    pub listings: Vec<ListingConfig>,
    pub details: DetailsConfig,
    pub units: UnitsConfig,
    #[serde(default)]
    pub media: Option<MediaConfig>,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

/// Identity and transport settings of a source
#[derive(Debug, Clone, Deserialize)]
pub struct SourceInfo {
    pub name: String,

    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(default = "default_lang")]
    pub lang: String,

    /// Upper bound on concurrent sub-fetches during fan-out
    #[serde(rename = "max-concurrency", default = "default_concurrency")]
    pub max_concurrency: usize,

    #[serde(rename = "timeout-secs", default = "default_timeout")]
    pub timeout_secs: u64,

    /// Status codes treated as an empty document instead of a failure
    #[serde(rename = "tolerated-statuses", default)]
    pub tolerated_statuses: Vec<u16>,
}

/// Default request headers
#[derive(Debug, Clone, Deserialize)]
pub struct HeadersConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Referer sent with every request; defaults to the base URL
    #[serde(default)]
    pub referer: Option<String>,

    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            referer: None,
            extra: BTreeMap::new(),
        }
    }
}

/// What a field rule reads from the matched element
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadMode {
    /// All descendant text, whitespace-collapsed
    #[default]
    Text,
    /// Only the element's direct text nodes
    OwnText,
    /// An attribute value
    Attr(String),
}

/// How a field's raw text is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldParse {
    #[default]
    Text,
    Status,
    Ordinal,
    Date,
    Url,
}

/// One field of a rule set: an ordered fallback chain of selectors
#[derive(Debug, Clone, Deserialize)]
pub struct FieldRule {
    /// Tried in order; the first one yielding non-empty content wins. An
    /// empty chain reads the scope element itself (the listing item).
    #[serde(default)]
    pub selectors: Vec<String>,

    #[serde(default)]
    pub read: ReadMode,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub parse: FieldParse,

    /// Collect every match of the winning selector instead of the first
    #[serde(default)]
    pub multiple: bool,
}

/// A paginated catalog listing (popular, latest, search, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    pub name: String,

    /// URL template; `{page}` is replaced by the 1-based page index and
    /// `{query}` by the url-encoded search text
    pub url: String,

    #[serde(rename = "item-selector")]
    pub item_selector: String,

    pub fields: BTreeMap<String, FieldRule>,

    #[serde(rename = "next-page-selector", default)]
    pub next_page_selector: Option<String>,

    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default)]
    pub dedupe: bool,
}

/// Detail page rules; the `title` field is always mandatory
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsConfig {
    pub fields: BTreeMap<String, FieldRule>,
}

/// Shape of a source's unit list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitLayout {
    #[default]
    Flat,
    Grouped,
}

/// Order in which units are returned to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitOrder {
    OldestFirst,
    #[default]
    NewestFirst,
}

/// Episode / chapter list rules
#[derive(Debug, Clone, Deserialize)]
pub struct UnitsConfig {
    #[serde(default)]
    pub layout: UnitLayout,

    #[serde(rename = "item-selector")]
    pub item_selector: String,

    pub fields: BTreeMap<String, FieldRule>,

    #[serde(rename = "next-page-selector", default)]
    pub next_page_selector: Option<String>,

    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(rename = "group-selector", default)]
    pub group_selector: Option<String>,

    #[serde(rename = "group-url-attr", default = "default_href")]
    pub group_url_attr: String,

    /// Selector inside the group element for its label; element text if unset
    #[serde(rename = "group-label-selector", default)]
    pub group_label_selector: Option<String>,

    /// Order in which the caller receives units
    #[serde(default)]
    pub order: UnitOrder,

    /// Order in which the page lists units
    #[serde(rename = "page-order", default)]
    pub page_order: UnitOrder,

    /// chrono format string for the `date` field
    #[serde(rename = "date-format", default = "default_date_format")]
    pub date_format: String,
}

/// How mirror values are encoded on the unit page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MirrorEncoding {
    #[default]
    Plain,
    /// Base64 of an HTML snippet holding the player iframe
    Base64Html,
}

/// Mirror extraction rules for the unit page
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(rename = "mirror-selector")]
    pub mirror_selector: String,

    #[serde(rename = "mirror-url-attr", default = "default_value_attr")]
    pub mirror_url_attr: String,

    /// Selector inside the mirror element for its label; element text if unset
    #[serde(rename = "mirror-label-selector", default)]
    pub mirror_label_selector: Option<String>,

    /// Attribute of the mirror element holding its language track (e.g.
    /// `data-type` = "sub" / "dub")
    #[serde(rename = "mirror-language-attr", default)]
    pub mirror_language_attr: Option<String>,

    #[serde(default)]
    pub encoding: MirrorEncoding,
}

/// User preferences consumed at sort time
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_max_pages() -> u32 {
    50
}

fn default_href() -> String {
    "href".to_string()
}

fn default_value_attr() -> String {
    "value".to_string()
}

fn default_date_format() -> String {
    "%B %d, %Y".to_string()
}
