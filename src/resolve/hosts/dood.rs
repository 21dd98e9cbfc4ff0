use crate::fetch::Fetcher;
use crate::model::MediaDescriptor;
use crate::resolve::decode::{dood_pass_path, dood_token, dood_video_url};
use crate::resolve::hosts::{origin_of, tagged};
use crate::resolve::{Embed, HostResolver};
use crate::KagamiError;
use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const HOST: &str = "doodstream";

/// Doodstream and its many mirror domains
///
/// The embed page references a `/pass_md5/...` path. Fetching it (with the
/// embed page as Referer) returns a URL prefix, completed by ten random
/// alphanumerics, the token and an expiry timestamp.
pub struct DoodResolver;

#[async_trait]
impl HostResolver for DoodResolver {
    fn name(&self) -> &str {
        "Doodstream"
    }

    async fn resolve(
        &self,
        fetcher: &Fetcher,
        embed: &Embed,
    ) -> Result<Vec<MediaDescriptor>, KagamiError> {
        let embed_url = embed.url.replace("/d/", "/e/");
        let page = fetcher.fetch(&embed_url).await?;

        let pass_path = dood_pass_path(&page.body)
            .ok_or_else(|| KagamiError::decode(HOST, "pass_md5 path not found"))?;
        let token = dood_token(&pass_path).to_string();

        let origin = origin_of(&page.url);
        let pass_url = format!("{}{}", origin, pass_path);
        let prefix = fetcher
            .fetch_with_headers(&pass_url, &[("Referer", page.url.as_str())])
            .await?
            .body;

        if prefix.trim().is_empty() {
            return Err(KagamiError::decode(HOST, "empty pass_md5 response"));
        }

        let video = dood_video_url(
            &prefix,
            &token,
            &random_suffix(10),
            Utc::now().timestamp_millis(),
        );

        Ok(vec![tagged(video, self.name(), None, embed)
            .with_header("Referer", format!("{}/", origin))])
    }
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
