use crate::config::{SourceConfig, UnitLayout};
use serde::Serialize;

/// Name of the listing used for free-text and filter search
pub const SEARCH_LISTING: &str = "search";

/// What a source declares it can do
///
/// Derived from the source definition. Operations branch on these flags
/// instead of failing inside a request; asking for something undeclared
/// yields `KagamiError::Unsupported`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Browsable listings other than search ("popular", "latest", ...)
    pub listings: Vec<String>,
    pub search: bool,
    pub unit_layout: UnitLayout,
    /// Unit pages carry mirror rules
    pub media: bool,
    pub hosts: Vec<String>,
}

impl Capabilities {
    pub fn from_config(config: &SourceConfig, hosts: Vec<String>) -> Self {
        Self {
            listings: config
                .listings
                .iter()
                .filter(|l| l.name != SEARCH_LISTING)
                .map(|l| l.name.clone())
                .collect(),
            search: config.listings.iter().any(|l| l.name == SEARCH_LISTING),
            unit_layout: config.units.layout,
            media: config.media.is_some(),
            hosts,
        }
    }

    pub fn has_listing(&self, name: &str) -> bool {
        self.listings.iter().any(|l| l == name) || (name == SEARCH_LISTING && self.search)
    }
}
