//! HTTP fetching for sources and host resolvers
//!
//! This module contains:
//! - Building the HTTP client with the source's default headers
//! - Fetching a locator into a raw `Document`
//! - Classifying failures into the network error class

mod document;
mod fetcher;

pub use document::Document;
pub use fetcher::{build_http_client, Fetcher};
