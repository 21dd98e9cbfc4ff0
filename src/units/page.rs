use crate::config::UnitsConfig;
use crate::extract::{compile, element_label, is_json_pointer, Extractor, Record};
use crate::fetch::Document;
use crate::model::{parse_ordinal, Unit};
use crate::paginate::Page;
use crate::url::{absolutize, identifier_for};
use crate::KagamiError;
use url::Url;

/// One season / volume / language tab of a grouped unit list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitGroup {
    pub url: String,
    pub label: String,
}

/// Extracts the units of one page, plus the link to its next page
pub fn units_page(
    document: &Document,
    config: &UnitsConfig,
    group: Option<&str>,
) -> Result<Page<Unit>, KagamiError> {
    let records = Extractor::new(&config.fields)
        .with_date_format(&config.date_format)
        .extract_items(document, &config.item_selector)?;

    let units = records
        .iter()
        .filter_map(|record| unit_from_record(record, &document.url, group))
        .collect();

    let next_url = match &config.next_page_selector {
        Some(selector) => next_link(document, selector)?,
        None => None,
    };

    Ok(Page::with_next_url(units, next_url))
}

/// Enumerates the groups listed on an entry page
pub fn find_groups(
    document: &Document,
    config: &UnitsConfig,
) -> Result<Vec<UnitGroup>, KagamiError> {
    let Some(group_selector) = &config.group_selector else {
        return Ok(Vec::new());
    };
    if document.is_empty() {
        return Ok(Vec::new());
    }

    let selector = compile(group_selector)?;
    let label_selector = config
        .group_label_selector
        .as_deref()
        .map(compile)
        .transpose()?;

    let html = document.html();
    let mut groups: Vec<UnitGroup> = Vec::new();

    for element in html.select(&selector) {
        let Some(href) = element.value().attr(&config.group_url_attr) else {
            continue;
        };
        let Some(url) = absolutize(href, &document.url) else {
            continue;
        };
        if groups.iter().any(|g| g.url == url) {
            continue;
        }

        let label = element_label(element, label_selector.as_ref());
        groups.push(UnitGroup { url, label });
    }

    Ok(groups)
}

/// Link to the next page: the `href` of a CSS match, or the string at a
/// JSON pointer
fn next_link(document: &Document, selector: &str) -> Result<Option<String>, KagamiError> {
    if document.is_empty() {
        return Ok(None);
    }

    if is_json_pointer(selector) {
        if !document.looks_like_json() {
            return Ok(None);
        }
        let value = document.json()?;
        return Ok(value
            .pointer(selector)
            .and_then(|next| next.as_str())
            .and_then(|href| absolutize(href, &document.url)));
    }

    let selector = compile(selector)?;
    let html = document.html();
    let link = html
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| absolutize(href, &document.url));
    Ok(link)
}

/// Builds a unit from an extracted record; `None` when it has no link
fn unit_from_record(record: &Record, page_url: &Url, group: Option<&str>) -> Option<Unit> {
    let href = record.text("url")?;
    let absolute = absolutize(href, page_url)?;
    let locator = identifier_for(&absolute, page_url);

    let mut name = record.text("name").unwrap_or_default().to_string();
    let ordinal = match record.ordinal("ordinal") {
        n if n != 0.0 => n,
        _ => parse_ordinal(&name),
    };
    if ordinal == 0.0 {
        tracing::debug!("Unit '{}' has no ordinal, using 0", name);
    }
    if name.is_empty() {
        name = ordinal.to_string();
    }

    let mut unit = Unit::new(ordinal, name, locator);
    unit.published_at = record.timestamp("date");
    unit.group = group
        .map(str::to_string)
        .or_else(|| record.text("group").map(str::to_string));
    Some(unit)
}
