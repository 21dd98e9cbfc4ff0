use serde::{Deserialize, Serialize};

/// Prefix marking a deep-link search ("path:anime/some-show")
pub const PATH_PREFIX: &str = "path:";

/// Selection state of one option in a tri-state multi-select filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    Ignore,
    Include,
    Exclude,
}

/// Value of one filter widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    Select(String),
    MultiTriState(Vec<(String, TriState)>),
    Text(String),
}

/// One filter and the user's selection for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub key: String,
    pub value: FilterValue,
}

impl FilterSelection {
    pub fn new(key: impl Into<String>, value: FilterValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A search request, built fresh for every search invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchQuery {
    /// Free text search
    Text(String),
    /// Structured filter selections
    Filters(Vec<FilterSelection>),
    /// Deep link: domain-less path of a detail page (leading `/`)
    Path(String),
}

impl SearchQuery {
    /// Parses raw search input, recognizing the `path:` deep-link prefix
    pub fn parse(input: &str) -> Self {
        match input.trim().strip_prefix(PATH_PREFIX) {
            Some(path) => Self::Path(format!("/{}", path.trim().trim_start_matches('/'))),
            None => Self::Text(input.trim().to_string()),
        }
    }

    /// Free text of the query, empty for filter and path queries
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }

    /// Converts filter selections into request query parameters
    ///
    /// Empty selections are skipped. Tri-state options become `key[]=value`
    /// when included and `key[]=-value` when excluded.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let Self::Filters(filters) = self else {
            return Vec::new();
        };

        let mut params = Vec::new();
        for filter in filters {
            match &filter.value {
                FilterValue::Select(value) | FilterValue::Text(value) => {
                    if !value.is_empty() {
                        params.push((filter.key.clone(), value.clone()));
                    }
                }
                FilterValue::MultiTriState(options) => {
                    let key = format!("{}[]", filter.key);
                    for (value, state) in options {
                        match state {
                            TriState::Include => params.push((key.clone(), value.clone())),
                            TriState::Exclude => params.push((key.clone(), format!("-{}", value))),
                            TriState::Ignore => {}
                        }
                    }
                }
            }
        }
        params
    }
}
