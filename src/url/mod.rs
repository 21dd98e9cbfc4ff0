//! URL handling module for Kagami
//!
//! This module provides domain extraction, wildcard host matching and the
//! conversions between absolute URLs and the domain-less identifiers that
//! entries and units are keyed by.

mod domain;
mod matcher;
mod relative;

// Re-export main functions
pub use domain::{bare_domain, extract_domain};
pub use matcher::matches_wildcard;
pub use relative::{absolutize, deep_link_path, identifier_for, url_without_domain};
