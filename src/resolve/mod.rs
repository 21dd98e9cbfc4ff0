//! Embed resolution
//!
//! An embed URL found on a unit page is matched against an ordered list of
//! host signatures; the first match dispatches to that host's resolver,
//! which may fetch the embed page and decode its payload into playable
//! media descriptors.
//!
//! # Components
//!
//! - `HostResolver`: the per-host extraction seam
//! - `HostRegistry`: ordered signature table, single and fan-out resolution
//! - `decode`: pure decoders for host obfuscation schemes
//! - `MediaPreferences` / `sort_media`: preference-ordered final sort

pub mod decode;
pub mod hosts;
mod preference;
mod registry;

pub use preference::{sort_media, MediaPreferences};
pub use registry::{HostRegistry, HostSignature};

use crate::fetch::Fetcher;
use crate::model::MediaDescriptor;
use crate::KagamiError;
use async_trait::async_trait;

/// One mirror to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// Absolute embed/player URL
    pub url: String,

    /// Human-readable server tag shown by the unit page ("Streamtape 720p")
    pub label: String,

    /// Language/track tag ("SUB", "DUB"), empty when unknown
    pub language: String,
}

impl Embed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: String::new(),
            language: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Extracts playable media from one hosting service's embed page
///
/// Implementations fetch through the given `Fetcher`, keep decoding in
/// `decode` functions, and report undecodable payloads as
/// `KagamiError::Decode`.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Server name placed on produced descriptors
    fn name(&self) -> &str;

    async fn resolve(
        &self,
        fetcher: &Fetcher,
        embed: &Embed,
    ) -> Result<Vec<MediaDescriptor>, KagamiError>;
}
