use crate::config::PreferencesConfig;
use crate::model::MediaDescriptor;
use std::cmp::Reverse;

/// User preferences applied when ordering resolved media
///
/// Passed explicitly to the sort so ordering is a pure function of its
/// inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPreferences {
    pub quality: Option<String>,
    pub language: Option<String>,
    pub server: Option<String>,
}

impl From<&PreferencesConfig> for MediaPreferences {
    fn from(config: &PreferencesConfig) -> Self {
        Self {
            quality: config.quality.clone(),
            language: config.language.clone(),
            server: config.server.clone(),
        }
    }
}

impl MediaPreferences {
    /// Sorts media in place; see `sort_media`
    pub fn sort(&self, media: &mut [MediaDescriptor]) {
        sort_media(media, self);
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) if !needle.is_empty() => {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        _ => false,
    }
}

/// Orders media by the preference tuple
///
/// Keys, in priority order: preferred language, preferred server substring,
/// preferred quality substring, numeric quality descending. The sort is
/// stable, so equal descriptors keep their resolution order and sorting an
/// already sorted list changes nothing.
pub fn sort_media(media: &mut [MediaDescriptor], preferences: &MediaPreferences) {
    media.sort_by_key(|m| {
        (
            Reverse(contains_ignore_case(&m.language, preferences.language.as_deref())),
            Reverse(contains_ignore_case(&m.server, preferences.server.as_deref())),
            Reverse(contains_ignore_case(&m.quality, preferences.quality.as_deref())),
            Reverse(m.numeric_quality()),
        )
    });
}
