//! Pure decoders for host obfuscation schemes
//!
//! Every function here is `&str -> Option<...>` with no I/O so it can be
//! tested against captured payloads. `None` means the payload did not have
//! the expected shape.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use std::sync::OnceLock;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("static regex"))
        }
    };
}

static_regex!(
    packed_regex,
    r"(?s)\}\s*\('(.*)',\s*(\d+),\s*(\d+),\s*'(.*?)'\.split\('\|'\)"
);
static_regex!(word_regex, r"\b\w+\b");
static_regex!(
    robotlink_regex,
    r#"getElementById\('robotlink'\)\.innerHTML\s*=\s*'([^']*)'\s*\+\s*\('([^']*)'\)((?:\.substring\(\d+\))*)"#
);
static_regex!(substring_regex, r"\.substring\((\d+)\)");
static_regex!(pass_md5_regex, r"'(/pass_md5/[^']+)'");
static_regex!(wurl_regex, r#"MDCore\.wurl\s*=\s*"([^"]+)""#);
static_regex!(sources_regex, r"(?s)sources\s*:\s*\[(.*?)\]");
static_regex!(tracks_regex, r"(?s)tracks\s*:\s*\[(.*?)\]");
static_regex!(object_regex, r"\{([^{}]*)\}");
static_regex!(file_regex, r#"["']?file["']?\s*:\s*["']([^"']+)["']"#);
static_regex!(label_regex, r#"["']?label["']?\s*:\s*["']([^"']*)["']"#);
static_regex!(kind_regex, r#"["']?kind["']?\s*:\s*["']([^"']*)["']"#);
static_regex!(
    bare_file_regex,
    r#"file\s*:\s*["']([^"']+\.(?:m3u8|mp4)[^"']*)["']"#
);

const PACKED_MARKER: &str = "eval(function(p,a,c,k,e,d)";

/// True when the text contains a `p,a,c,k,e,d` packed script
pub fn is_packed(script: &str) -> bool {
    script.contains(PACKED_MARKER)
}

/// Unpacks the first `p,a,c,k,e,d` packed script of a page
pub fn unpack_packed(script: &str) -> Option<String> {
    unpack_all(script).into_iter().next()
}

/// Unpacks every packed script of a page, in page order
///
/// Each script is decoded on its own, so an ad script packed next to the
/// player script does not leak its keywords into the player payload.
pub fn unpack_all(page: &str) -> Vec<String> {
    page.split(PACKED_MARKER).filter_map(unpack_block).collect()
}

/// Unpacks one Dean Edwards packed block
///
/// Every word of the payload is read as a base-`a` number and replaced by the
/// keyword at that index; words without a keyword are left as they are.
fn unpack_block(script: &str) -> Option<String> {
    let caps = packed_regex().captures(script)?;
    let payload = caps.get(1)?.as_str().replace("\\'", "'");
    let base: u32 = caps.get(2)?.as_str().parse().ok()?;
    let keywords: Vec<&str> = caps.get(4)?.as_str().split('|').collect();

    if !(2..=62).contains(&base) {
        return None;
    }

    let unpacked = word_regex().replace_all(&payload, |word: &Captures| {
        let word = &word[0];
        match base_n_value(word, base).and_then(|i| keywords.get(i)) {
            Some(keyword) if !keyword.is_empty() => keyword.to_string(),
            _ => word.to_string(),
        }
    });

    Some(unpacked.into_owned())
}

/// Reads a word in the packer's base-N alphabet (0-9, a-z, A-Z)
fn base_n_value(word: &str, base: u32) -> Option<usize> {
    word.chars().try_fold(0usize, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'a'..='z' => c as u32 - 'a' as u32 + 10,
            'A'..='Z' => c as u32 - 'A' as u32 + 36,
            _ => return None,
        };
        if digit >= base {
            return None;
        }
        acc.checked_mul(base as usize)?.checked_add(digit as usize)
    })
}

/// Assembles the streamtape video link from its `robotlink` script
///
/// The page writes the link as a literal prefix plus a string literal cut by
/// one or more `.substring(n)` calls.
pub fn streamtape_link(page: &str) -> Option<String> {
    let caps = robotlink_regex().captures(page)?;
    let prefix = caps.get(1)?.as_str();
    let mut tail: String = caps.get(2)?.as_str().to_string();

    for cut in substring_regex().captures_iter(caps.get(3)?.as_str()) {
        let n: usize = cut.get(1)?.as_str().parse().ok()?;
        tail = tail.chars().skip(n).collect();
    }

    let link = format!("{}{}", prefix, tail);
    if link.is_empty() {
        return None;
    }
    Some(upgrade_protocol_relative(&link))
}

/// Finds the `/pass_md5/...` path in a doodstream embed page
pub fn dood_pass_path(page: &str) -> Option<String> {
    pass_md5_regex()
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The doodstream token is the last segment of the pass_md5 path
pub fn dood_token(pass_path: &str) -> &str {
    pass_path.rsplit('/').next().unwrap_or_default()
}

/// Builds the final doodstream URL from the pass_md5 response
pub fn dood_video_url(prefix: &str, token: &str, random_suffix: &str, expiry_millis: i64) -> String {
    format!(
        "{}{}?token={}&expiry={}",
        prefix.trim(),
        random_suffix,
        token,
        expiry_millis
    )
}

/// Reads the `MDCore.wurl` assignment from an unpacked mixdrop script
pub fn mixdrop_wurl(unpacked: &str) -> Option<String> {
    wurl_regex()
        .captures(unpacked)
        .and_then(|caps| caps.get(1))
        .map(|m| upgrade_protocol_relative(m.as_str()))
}

/// A stream declared in a jwplayer setup block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSource {
    pub file: String,
    pub label: Option<String>,
}

/// A text track declared in a jwplayer setup block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTrack {
    pub file: String,
    pub label: String,
}

/// Reads `sources:[{file:"...", label:"..."}]` from a jwplayer setup
///
/// Falls back to any bare `file:"...m3u8|mp4"` when no sources array exists.
pub fn jwplayer_sources(script: &str) -> Vec<PlayerSource> {
    if let Some(block) = sources_regex().captures(script).and_then(|c| c.get(1)) {
        let sources: Vec<PlayerSource> = object_regex()
            .captures_iter(block.as_str())
            .filter_map(|obj| {
                let body = obj.get(1)?.as_str();
                let file = file_regex().captures(body)?.get(1)?.as_str().to_string();
                let label = label_regex()
                    .captures(body)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .filter(|l| !l.is_empty());
                Some(PlayerSource { file, label })
            })
            .collect();
        if !sources.is_empty() {
            return sources;
        }
    }

    bare_file_regex()
        .captures(script)
        .and_then(|c| c.get(1))
        .map(|m| {
            vec![PlayerSource {
                file: m.as_str().to_string(),
                label: None,
            }]
        })
        .unwrap_or_default()
}

/// Reads caption tracks from a jwplayer setup, skipping thumbnail tracks
pub fn jwplayer_tracks(script: &str) -> Vec<PlayerTrack> {
    let Some(block) = tracks_regex().captures(script).and_then(|c| c.get(1)) else {
        return Vec::new();
    };

    object_regex()
        .captures_iter(block.as_str())
        .filter_map(|obj| {
            let body = obj.get(1)?.as_str();
            let kind = kind_regex()
                .captures(body)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            if kind == "thumbnails" {
                return None;
            }
            let file = file_regex().captures(body)?.get(1)?.as_str().to_string();
            let label = label_regex()
                .captures(body)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            Some(PlayerTrack { file, label })
        })
        .collect()
}

/// Decodes a base64 mirror value holding an HTML player snippet
///
/// Returns the iframe `src`, or the `meta[itemprop=embedUrl]` content when
/// there is no iframe.
pub fn embed_from_base64_html(value: &str) -> Option<String> {
    let bytes = STANDARD.decode(value.trim()).ok()?;
    let snippet = String::from_utf8_lossy(&bytes);
    let fragment = Html::parse_fragment(&snippet);

    let iframe = Selector::parse("iframe[src]").ok()?;
    let meta = Selector::parse("meta[itemprop=embedUrl][content]").ok()?;

    let src = fragment
        .select(&iframe)
        .filter_map(|e| e.value().attr("src"))
        .chain(fragment.select(&meta).filter_map(|e| e.value().attr("content")))
        .map(str::trim)
        .find(|s| !s.is_empty())?;

    Some(upgrade_protocol_relative(src))
}

/// Prefixes protocol-relative URLs (`//host/...`) with `https:`
pub fn upgrade_protocol_relative(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}
