use crate::fetch::Fetcher;
use crate::model::MediaDescriptor;
use crate::resolve::decode::{is_packed, mixdrop_wurl, unpack_all};
use crate::resolve::hosts::{origin_of, tagged};
use crate::resolve::{Embed, HostResolver};
use crate::KagamiError;
use async_trait::async_trait;

const HOST: &str = "mixdrop";

/// MixDrop: `MDCore.wurl` inside a packed script
pub struct MixdropResolver;

#[async_trait]
impl HostResolver for MixdropResolver {
    fn name(&self) -> &str {
        "MixDrop"
    }

    async fn resolve(
        &self,
        fetcher: &Fetcher,
        embed: &Embed,
    ) -> Result<Vec<MediaDescriptor>, KagamiError> {
        let embed_url = embed.url.replace("/f/", "/e/");
        let page = fetcher.fetch(&embed_url).await?;

        if !is_packed(&page.body) {
            return Err(KagamiError::decode(HOST, "packed script not found"));
        }
        let video = unpack_all(&page.body)
            .iter()
            .find_map(|script| mixdrop_wurl(script))
            .ok_or_else(|| KagamiError::decode(HOST, "MDCore.wurl not found"))?;

        let origin = origin_of(&page.url);
        Ok(vec![tagged(video, self.name(), None, embed)
            .with_header("Referer", format!("{}/", origin))
            .with_header("Origin", origin)])
    }
}
