use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One episode or chapter of a catalog entry
///
/// `ordinal` may be fractional (specials such as 12.5) and is `0.0` when the
/// visible label has no digits. `published_at` is epoch milliseconds with
/// `0` meaning unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub ordinal: f64,
    pub name: String,
    pub locator: String,
    pub published_at: i64,
    pub group: Option<String>,
}

impl Unit {
    pub fn new(ordinal: f64, name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
            locator: locator.into(),
            published_at: 0,
            group: None,
        }
    }

    /// False when the publish date fell back to the unknown sentinel
    pub fn has_known_date(&self) -> bool {
        self.published_at != 0
    }

    /// False when no digits were found in the unit label
    pub fn has_known_ordinal(&self) -> bool {
        self.ordinal != 0.0
    }
}

fn ordinal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:[.,]\d+)?)").expect("static regex"))
}

/// Derives a unit ordinal from its visible label
///
/// The first number in the text wins; a comma decimal separator is accepted.
/// Text without digits yields `0.0`.
///
/// # Examples
///
/// ```
/// use kagami::model::parse_ordinal;
///
/// assert_eq!(parse_ordinal("Episode 12"), 12.0);
/// assert_eq!(parse_ordinal("Chapter 10.5 - Extra"), 10.5);
/// assert_eq!(parse_ordinal("Movie"), 0.0);
/// ```
pub fn parse_ordinal(text: &str) -> f64 {
    ordinal_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .unwrap_or(0.0)
}
