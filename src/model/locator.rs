use serde::{Deserialize, Serialize};

/// One mirror packed into a unit locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lang: String,
}

/// Several mirrors serialized into a unit's single locator string
///
/// Sources whose episode list already carries every mirror store them as a
/// small JSON object instead of a page URL, so resolving media needs no
/// extra page fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorLocator {
    pub mirrors: Vec<MirrorRef>,
}

impl MirrorLocator {
    pub fn push(&mut self, url: impl Into<String>, lang: impl Into<String>) {
        self.mirrors.push(MirrorRef {
            url: url.into(),
            lang: lang.into(),
        });
    }

    /// Serializes into the locator string form
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Reads a packed locator; `None` when the locator is a plain URL/path
    pub fn decode(locator: &str) -> Option<Self> {
        let trimmed = locator.trim_start();
        if !trimmed.starts_with('{') {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }
}
