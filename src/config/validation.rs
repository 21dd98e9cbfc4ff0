use crate::config::types::{
    FieldRule, ListingConfig, MediaConfig, SourceConfig, SourceInfo, UnitLayout, UnitsConfig,
};
use crate::ConfigError;
use scraper::Selector;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Validates the entire source definition
pub fn validate(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_source_info(&config.source)?;
    validate_listings(&config.listings)?;
    validate_fields("details", &config.details.fields, &["title"])?;
    validate_units(&config.units)?;
    if let Some(media) = &config.media {
        validate_media(media)?;
    }
    Ok(())
}

/// Validates identity and transport settings
fn validate_source_info(info: &SourceInfo) -> Result<(), ConfigError> {
    if info.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "source name cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&info.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            info.base_url
        )));
    }

    if info.max_concurrency < 1 || info.max_concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "max-concurrency must be between 1 and 32, got {}",
            info.max_concurrency
        )));
    }

    if info.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates every listing and checks that names are unique
fn validate_listings(listings: &[ListingConfig]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for listing in listings {
        if !names.insert(listing.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate listing name '{}'",
                listing.name
            )));
        }

        if !listing.url.contains("{page}") {
            return Err(ConfigError::Validation(format!(
                "listing '{}' url must contain a {{page}} placeholder",
                listing.name
            )));
        }

        if listing.max_pages < 1 {
            return Err(ConfigError::Validation(format!(
                "listing '{}' max-pages must be >= 1",
                listing.name
            )));
        }

        // A leading '/' addresses the item array of a JSON response
        if !listing.item_selector.starts_with('/') {
            validate_selector(&listing.item_selector)?;
        }
        if let Some(next) = &listing.next_page_selector {
            validate_selector(next)?;
        }
        validate_fields(&listing.name, &listing.fields, &["url", "title"])?;
    }

    Ok(())
}

/// Validates unit list rules
fn validate_units(units: &UnitsConfig) -> Result<(), ConfigError> {
    // JSON episode APIs address their item array and next link by pointer
    if !units.item_selector.starts_with('/') {
        validate_selector(&units.item_selector)?;
    }
    validate_fields("units", &units.fields, &["url"])?;

    if let Some(next) = &units.next_page_selector {
        if !next.starts_with('/') {
            validate_selector(next)?;
        }
    }

    if units.max_pages < 1 {
        return Err(ConfigError::Validation(
            "units max-pages must be >= 1".to_string(),
        ));
    }

    if let Some(label) = &units.group_label_selector {
        validate_selector(label)?;
    }

    match (&units.layout, &units.group_selector) {
        (UnitLayout::Grouped, None) => Err(ConfigError::Validation(
            "grouped unit layout requires group-selector".to_string(),
        )),
        (UnitLayout::Grouped, Some(group)) => validate_selector(group),
        (UnitLayout::Flat, _) => Ok(()),
    }
}

/// Validates mirror extraction rules
fn validate_media(media: &MediaConfig) -> Result<(), ConfigError> {
    validate_selector(&media.mirror_selector)?;
    if let Some(label) = &media.mirror_label_selector {
        validate_selector(label)?;
    }
    Ok(())
}

/// Checks that mandatory fields exist and every selector parses
fn validate_fields(
    scope: &str,
    fields: &BTreeMap<String, FieldRule>,
    mandatory: &[&str],
) -> Result<(), ConfigError> {
    for name in mandatory {
        if !fields.contains_key(*name) {
            return Err(ConfigError::Validation(format!(
                "{} rules must define a '{}' field",
                scope, name
            )));
        }
    }

    for rule in fields.values() {
        for selector in &rule.selectors {
            // JSON pointers address JSON documents and are not CSS
            if !selector.starts_with('/') {
                validate_selector(selector)?;
            }
        }
    }

    Ok(())
}

/// Validates that a CSS selector parses
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
