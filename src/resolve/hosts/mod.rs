//! Built-in host resolvers

mod direct;
mod dood;
mod mixdrop;
mod packed;
mod streamtape;

pub use direct::DirectResolver;
pub use dood::DoodResolver;
pub use mixdrop::MixdropResolver;
pub use packed::PackedPlayerResolver;
pub use streamtape::StreamtapeResolver;

use crate::model::MediaDescriptor;
use crate::resolve::{Embed, HostRegistry, HostSignature};
use regex::Regex;
use url::Url;

/// Registers the built-in hosts in match order
pub(crate) fn register_builtin(registry: &mut HostRegistry) {
    registry
        .register(
            vec![
                HostSignature::Substring("dood".to_string()),
                HostSignature::Domain("*.ds2play.com".to_string()),
                HostSignature::Domain("*.d0000d.com".to_string()),
            ],
            DoodResolver,
        )
        .register(
            vec![
                HostSignature::Substring("streamtape".to_string()),
                HostSignature::Substring("strtape".to_string()),
            ],
            StreamtapeResolver,
        )
        .register(
            vec![
                HostSignature::Substring("mixdrop".to_string()),
                HostSignature::Substring("mixdrp".to_string()),
            ],
            MixdropResolver,
        )
        .register(
            vec![
                HostSignature::Substring("filemoon".to_string()),
                HostSignature::Substring("moonplayer".to_string()),
            ],
            PackedPlayerResolver::new("Filemoon"),
        )
        .register(
            vec![
                HostSignature::Substring("streamwish".to_string()),
                HostSignature::Substring("vidhide".to_string()),
            ],
            PackedPlayerResolver::new("StreamWish"),
        );

    if let Ok(media_file) = Regex::new(r"(?i)\.(mp4|m3u8)(\?|$)") {
        registry.register(vec![HostSignature::Pattern(media_file)], DirectResolver);
    }
}

/// `scheme://host[:port]` of a URL, used for Referer/Origin headers
pub(crate) fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Descriptor tagged with the embed's context label and language
///
/// `quality` is the host-provided label when there is one, otherwise the
/// label shown on the unit page.
pub(crate) fn tagged(
    url: impl Into<String>,
    server: &str,
    quality: Option<&str>,
    embed: &Embed,
) -> MediaDescriptor {
    let quality = match (quality, embed.label.is_empty()) {
        (Some(q), true) => q.to_string(),
        (Some(q), false) => format!("{} - {}", embed.label, q),
        (None, false) => embed.label.clone(),
        (None, true) => server.to_string(),
    };

    MediaDescriptor::new(url, server)
        .with_quality(quality)
        .with_language(embed.language.clone())
}
