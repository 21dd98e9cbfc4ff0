use crate::fetch::Fetcher;
use crate::model::MediaDescriptor;
use crate::resolve::decode::streamtape_link;
use crate::resolve::hosts::{origin_of, tagged};
use crate::resolve::{Embed, HostResolver};
use crate::KagamiError;
use async_trait::async_trait;

/// Streamtape: the link is assembled by the page's `robotlink` script
pub struct StreamtapeResolver;

#[async_trait]
impl HostResolver for StreamtapeResolver {
    fn name(&self) -> &str {
        "Streamtape"
    }

    async fn resolve(
        &self,
        fetcher: &Fetcher,
        embed: &Embed,
    ) -> Result<Vec<MediaDescriptor>, KagamiError> {
        let embed_url = embed.url.replace("/v/", "/e/");
        let page = fetcher.fetch(&embed_url).await?;

        let video = streamtape_link(&page.body)
            .ok_or_else(|| KagamiError::decode("streamtape", "robotlink script not found"))?;

        Ok(vec![tagged(video, self.name(), None, embed)
            .with_header("Referer", format!("{}/", origin_of(&page.url)))])
    }
}
