use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Publication status of a catalog entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Unknown,
    Ongoing,
    Completed,
}

impl EntryStatus {
    /// Maps the free-form status label shown by a site to a status
    ///
    /// Unrecognized labels map to `Unknown`; this never fails.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        const ONGOING: &[&str] = &[
            "ongoing",
            "releasing",
            "airing",
            "publishing",
            "currently airing",
            "em lançamento",
            "en emision",
            "en emisión",
        ];
        const COMPLETED: &[&str] = &[
            "completed",
            "complete",
            "finished",
            "finished airing",
            "ended",
            "completo",
            "finalizado",
        ];

        if ONGOING.iter().any(|s| label.contains(s)) {
            Self::Ongoing
        } else if COMPLETED.iter().any(|s| label.contains(s)) {
            Self::Completed
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One title in a source's catalog
///
/// `identifier` is the domain-less path of the detail page and is unique
/// within one source. Requesting the detail page for it always yields the
/// same entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub identifier: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub status: EntryStatus,
    pub synopsis: Option<String>,
    pub tags: BTreeSet<String>,
}

impl CatalogEntry {
    /// Creates an entry with only the identifying fields set
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            thumbnail_url: None,
            status: EntryStatus::Unknown,
            synopsis: None,
            tags: BTreeSet::new(),
        }
    }
}
