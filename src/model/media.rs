use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A subtitle track attached to a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub url: String,
    pub label: String,
}

/// A playable stream for one unit
///
/// Produced by a host resolver and consumed immediately by the player; never
/// persisted. `headers` carries what the host requires on playback requests
/// (usually `Referer`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub url: String,
    pub server: String,
    pub quality: String,
    pub language: String,
    pub headers: BTreeMap<String, String>,
    pub subtitles: Vec<SubtitleTrack>,
}

fn resolution_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d{3,4})\s*p\b").expect("static regex"))
}

impl MediaDescriptor {
    pub fn new(url: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            server: server.into(),
            quality: String::new(),
            language: String::new(),
            headers: BTreeMap::new(),
            subtitles: Vec::new(),
        }
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_subtitles(mut self, subtitles: Vec<SubtitleTrack>) -> Self {
        self.subtitles = subtitles;
        self
    }

    /// Vertical resolution found in the quality label ("720p" -> 720), or 0
    pub fn numeric_quality(&self) -> u32 {
        resolution_regex()
            .captures(&self.quality)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }
}
