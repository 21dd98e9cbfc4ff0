use crate::config::types::SourceConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a source definition from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML source definition
///
/// # Returns
///
/// * `Ok(SourceConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<SourceConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates a source definition held in memory
pub fn parse_config(content: &str) -> Result<SourceConfig, ConfigError> {
    let config: SourceConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so that a changed source definition is visible when
/// comparing runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(SourceConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldParse, ReadMode, UnitLayout, UnitOrder};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
[source]
name = "AnimeStream Demo"
base-url = "https://anime.example"
tolerated-statuses = [404]

[headers]
referer = "https://anime.example/"

[headers.extra]
Accept-Language = "en-US"

[[listing]]
name = "popular"
url = "https://anime.example/anime/?page={page}&order=popular"
item-selector = "div.listupd article"
next-page-selector = "div.pagination a.next"
max-pages = 10
dedupe = true

[listing.fields.url]
selectors = ["a.tip"]
read = { attr = "href" }
required = true

[listing.fields.title]
selectors = ["div.tt", "div.ttl"]
read = "own-text"
required = true

[details.fields.title]
selectors = ["h1.entry-title"]
required = true

[details.fields.status]
selectors = ["div.spe span:nth-child(1)"]
parse = "status"

[units]
layout = "flat"
order = "oldest-first"
item-selector = "div.eplister li a"

[units.fields.name]
selectors = [".epl-num"]

[units.fields.url]
read = { attr = "href" }

[media]
mirror-selector = "select.mirror option"
encoding = "base64-html"

[preferences]
quality = "720p"
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.source.name, "AnimeStream Demo");
        assert_eq!(config.source.max_concurrency, 4);
        assert_eq!(config.source.tolerated_statuses, vec![404]);
        assert_eq!(config.listings.len(), 1);
        assert_eq!(config.listings[0].max_pages, 10);
        assert!(config.listings[0].dedupe);
        assert_eq!(
            config.listings[0].fields["url"].read,
            ReadMode::Attr("href".to_string())
        );
        assert_eq!(config.listings[0].fields["title"].read, ReadMode::OwnText);
        assert_eq!(config.details.fields["status"].parse, FieldParse::Status);
        assert_eq!(config.units.layout, UnitLayout::Flat);
        assert_eq!(config.units.order, UnitOrder::OldestFirst);
        assert_eq!(config.preferences.quality.as_deref(), Some("720p"));
        assert_eq!(
            config.headers.extra.get("Accept-Language").map(String::as_str),
            Some("en-US")
        );
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/source.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let result = parse_config("this is not valid TOML {{{");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_listing_without_page_placeholder() {
        let broken = VALID.replace("?page={page}&order=popular", "?order=popular");
        let result = parse_config(&broken);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_json_unit_list_accepted() {
        let json_units = VALID
            .replace(
                r#"item-selector = "div.eplister li a""#,
                "item-selector = \"/data/episodes\"\nnext-page-selector = \"/links/next\"",
            )
            .replace(r#"selectors = [".epl-num"]"#, r#"selectors = ["/title"]"#)
            .replace(
                "[units.fields.url]\nread = { attr = \"href\" }",
                "[units.fields.url]\nselectors = [\"/url\"]",
            );

        let config = parse_config(&json_units).unwrap();
        assert_eq!(config.units.item_selector, "/data/episodes");
        assert_eq!(config.units.next_page_selector.as_deref(), Some("/links/next"));
    }

    #[test]
    fn test_compute_config_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        assert_eq!(hash1, compute_config_hash(file1.path()).unwrap());
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, compute_config_hash(file2.path()).unwrap());
    }
}
