use crate::KagamiError;
use scraper::Html;
use serde_json::Value;
use url::Url;

/// A fetched page, kept as raw text
///
/// HTML is parsed on demand; parsed trees are not `Send` and must not be
/// held across an await point.
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL after redirects
    pub url: Url,

    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

impl Document {
    pub fn new(url: Url, status: u16, body: impl Into<String>) -> Self {
        Self {
            url,
            status,
            body: body.into(),
        }
    }

    /// Parses the body as an HTML document
    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Parses the body as JSON
    pub fn json(&self) -> Result<Value, KagamiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// True when the body is a JSON object or array
    pub fn looks_like_json(&self) -> bool {
        matches!(self.body.trim_start().chars().next(), Some('{') | Some('['))
    }

    /// True for tolerated error statuses and blank bodies
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}
