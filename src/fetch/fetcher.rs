use crate::config::{HeadersConfig, SourceInfo};
use crate::fetch::Document;
use crate::{ConfigError, KagamiError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client carrying the source's default headers
///
/// # Arguments
///
/// * `info` - Source transport settings (timeout)
/// * `headers` - User agent, referer and extra default headers
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(KagamiError)` - A configured header was not a valid HTTP header
pub fn build_http_client(info: &SourceInfo, headers: &HeadersConfig) -> Result<Client, KagamiError> {
    let mut defaults = HeaderMap::new();

    let referer = headers
        .referer
        .clone()
        .unwrap_or_else(|| format!("{}/", info.base_url.trim_end_matches('/')));
    defaults.insert(REFERER, header_value(&referer)?);

    for (name, value) in &headers.extra {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ConfigError::Validation(format!("invalid header name '{}': {}", name, e))
        })?;
        defaults.insert(name, header_value(value)?);
    }

    Client::builder()
        .user_agent(headers.user_agent.clone())
        .default_headers(defaults)
        .timeout(Duration::from_secs(info.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|source| KagamiError::Http {
            url: info.base_url.clone(),
            source,
        })
}

fn header_value(value: &str) -> Result<HeaderValue, KagamiError> {
    HeaderValue::from_str(value).map_err(|e| {
        ConfigError::Validation(format!("invalid header value '{}': {}", value, e)).into()
    })
}

/// Issues requests on behalf of one source
///
/// Redirects are followed by the client. A non-2xx status fails with
/// `KagamiError::Status` unless the source tolerates it, in which case an
/// empty document is returned (e.g. a 404 search page meaning "no results").
/// Nothing is retried; the user's refresh action is the retry mechanism.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    tolerated_statuses: Vec<u16>,
}

impl Fetcher {
    /// Creates a fetcher from a source's settings
    pub fn new(info: &SourceInfo, headers: &HeadersConfig) -> Result<Self, KagamiError> {
        Ok(Self {
            client: build_http_client(info, headers)?,
            tolerated_statuses: info.tolerated_statuses.clone(),
        })
    }

    /// Wraps an existing client, tolerating no error statuses
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            tolerated_statuses: Vec::new(),
        }
    }

    /// Fetches a URL with the default headers
    pub async fn fetch(&self, url: &str) -> Result<Document, KagamiError> {
        self.fetch_with_headers(url, &[]).await
    }

    /// Fetches a URL, adding or overriding request headers
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | `Document` |
    /// | Tolerated status | empty `Document` |
    /// | Other status | `Status` |
    /// | Timeout | `Timeout` |
    /// | Connection/TLS/body error | `Http` |
    pub async fn fetch_with_headers(
        &self,
        url: &str,
        extra_headers: &[(&str, &str)],
    ) -> Result<Document, KagamiError> {
        let parsed = Url::parse(url)?;
        tracing::debug!("GET {}", parsed);

        let mut request = self.client.get(parsed.clone());
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            if self.tolerated_statuses.contains(&status.as_u16()) {
                tracing::debug!("Tolerated HTTP {} for {}", status.as_u16(), url);
                return Ok(Document::new(final_url, status.as_u16(), String::new()));
            }
            return Err(KagamiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        Ok(Document::new(final_url, status.as_u16(), body))
    }
}

/// Maps a reqwest failure into the network error class
fn classify_error(url: &str, error: reqwest::Error) -> KagamiError {
    if error.is_timeout() {
        KagamiError::Timeout {
            url: url.to_string(),
        }
    } else {
        KagamiError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
