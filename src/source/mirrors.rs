use crate::config::{MediaConfig, MirrorEncoding};
use crate::extract::{compile, element_label};
use crate::fetch::Document;
use crate::resolve::decode::embed_from_base64_html;
use crate::resolve::Embed;
use crate::url::absolutize;
use crate::KagamiError;

/// Reads the mirror list of a unit page
///
/// Placeholder entries without a value ("Select server") are skipped, as
/// are values that do not decode to an embed URL.
pub fn extract_mirrors(document: &Document, config: &MediaConfig) -> Result<Vec<Embed>, KagamiError> {
    if document.is_empty() {
        return Ok(Vec::new());
    }

    let selector = compile(&config.mirror_selector)?;
    let label_selector = config
        .mirror_label_selector
        .as_deref()
        .map(compile)
        .transpose()?;

    let html = document.html();
    let mut embeds = Vec::new();

    for element in html.select(&selector) {
        let raw = match element.value().attr(&config.mirror_url_attr) {
            Some(raw) if !raw.trim().is_empty() => raw.trim(),
            _ => continue,
        };

        let url = match config.encoding {
            MirrorEncoding::Plain => absolutize(raw, &document.url),
            MirrorEncoding::Base64Html => embed_from_base64_html(raw),
        };
        let Some(url) = url else {
            tracing::debug!("Skipping undecodable mirror value on {}", document.url);
            continue;
        };

        let label = element_label(element, label_selector.as_ref());

        let language = config
            .mirror_language_attr
            .as_deref()
            .and_then(|attr| element.value().attr(attr))
            .map(|lang| lang.trim().to_uppercase())
            .unwrap_or_default();

        embeds.push(Embed::new(url).with_label(label).with_language(language));
    }

    Ok(embeds)
}
