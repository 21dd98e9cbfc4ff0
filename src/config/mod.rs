//! Configuration module for Kagami
//!
//! A source is described by a TOML file: base URL and headers, the listing
//! pages it exposes, the selector rules for details and units, and how
//! mirrors are read from a unit page.
//!
//! # Example
//!
//! ```no_run
//! use kagami::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sources/animestream.toml")).unwrap();
//! println!("Loaded source {}", config.source.name);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    DetailsConfig, FieldParse, FieldRule, HeadersConfig, ListingConfig, MediaConfig,
    MirrorEncoding, PreferencesConfig, ReadMode, SourceConfig, SourceInfo, UnitLayout,
    UnitOrder, UnitsConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
