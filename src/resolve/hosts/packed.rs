use crate::fetch::Fetcher;
use crate::model::{MediaDescriptor, SubtitleTrack};
use crate::resolve::decode::{is_packed, jwplayer_sources, jwplayer_tracks, unpack_all};
use crate::resolve::hosts::{origin_of, tagged};
use crate::resolve::{Embed, HostResolver};
use crate::url::absolutize;
use crate::KagamiError;
use async_trait::async_trait;

/// jwplayer-based hosts whose setup block may be packed (Filemoon and
/// similar)
///
/// Reads every entry of `sources` plus caption `tracks`.
pub struct PackedPlayerResolver {
    name: String,
}

impl PackedPlayerResolver {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl HostResolver for PackedPlayerResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(
        &self,
        fetcher: &Fetcher,
        embed: &Embed,
    ) -> Result<Vec<MediaDescriptor>, KagamiError> {
        let page = fetcher.fetch(&embed.url).await?;

        let scripts = if is_packed(&page.body) {
            unpack_all(&page.body)
        } else {
            vec![page.body.clone()]
        };

        let Some((script, sources)) = scripts
            .iter()
            .map(|script| (script, jwplayer_sources(script)))
            .find(|(_, sources)| !sources.is_empty())
        else {
            return Err(KagamiError::decode(
                &self.name.to_lowercase(),
                "no player sources found",
            ));
        };

        let subtitles: Vec<SubtitleTrack> = jwplayer_tracks(script)
            .into_iter()
            .filter_map(|track| {
                absolutize(&track.file, &page.url).map(|url| SubtitleTrack {
                    url,
                    label: track.label,
                })
            })
            .collect();

        let referer = format!("{}/", origin_of(&page.url));
        let media = sources
            .into_iter()
            .filter_map(|source| {
                let url = absolutize(&source.file, &page.url)?;
                Some(
                    tagged(url, &self.name, source.label.as_deref(), embed)
                        .with_header("Referer", referer.clone())
                        .with_subtitles(subtitles.clone()),
                )
            })
            .collect();

        Ok(media)
    }
}
