use crate::fetch::Fetcher;
use crate::model::MediaDescriptor;
use crate::resolve::hosts::tagged;
use crate::resolve::{Embed, HostResolver};
use crate::KagamiError;
use async_trait::async_trait;

/// Embeds that already point at an `.mp4` or `.m3u8` file
pub struct DirectResolver;

#[async_trait]
impl HostResolver for DirectResolver {
    fn name(&self) -> &str {
        "Direct"
    }

    async fn resolve(
        &self,
        _fetcher: &Fetcher,
        embed: &Embed,
    ) -> Result<Vec<MediaDescriptor>, KagamiError> {
        Ok(vec![tagged(embed.url.clone(), self.name(), None, embed)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_direct_passthrough() {
        let fetcher = Fetcher::with_client(reqwest::Client::new());
        let embed = Embed::new("https://cdn.example/v/master.m3u8").with_label("HLS 1080p");

        let media = DirectResolver.resolve(&fetcher, &embed).await.unwrap();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].url, "https://cdn.example/v/master.m3u8");
        assert_eq!(media[0].numeric_quality(), 1080);
    }
}
