use crate::config::{FieldParse, FieldRule, ReadMode};
use crate::extract::{parse_date, FieldValue, Record};
use crate::fetch::Document;
use crate::model::{parse_ordinal, EntryStatus};
use crate::url::absolutize;
use crate::KagamiError;
use scraper::{ElementRef, Selector};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

const DEFAULT_DATE_FORMAT: &str = "%B %d, %Y";

/// Applies a rule set to a whole document
///
/// Convenience wrapper around `Extractor::extract` with the default date
/// format.
pub fn extract(
    document: &Document,
    rules: &BTreeMap<String, FieldRule>,
) -> Result<Record, KagamiError> {
    Extractor::new(rules).extract(document)
}

/// Checks whether a marker (e.g. a "next page" link) is present
///
/// For HTML documents the marker is a CSS selector. For JSON documents a
/// `/`-prefixed pointer is used and the marker is present when the value is
/// `true`, a non-empty string or a non-null value other than `false`.
pub fn has_marker(document: &Document, marker: &str) -> Result<bool, KagamiError> {
    if document.is_empty() {
        return Ok(false);
    }

    if is_json_pointer(marker) {
        if !document.looks_like_json() {
            return Ok(false);
        }
        let value = document.json()?;
        return Ok(match value.pointer(marker) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        });
    }

    let selector = compile(marker)?;
    let html = document.html();
    let found = html.select(&selector).next().is_some();
    Ok(found)
}

/// Applies a field rule set to documents or to the items of a listing
#[derive(Debug, Clone)]
pub struct Extractor<'a> {
    rules: &'a BTreeMap<String, FieldRule>,
    date_format: &'a str,
}

impl<'a> Extractor<'a> {
    pub fn new(rules: &'a BTreeMap<String, FieldRule>) -> Self {
        Self {
            rules,
            date_format: DEFAULT_DATE_FORMAT,
        }
    }

    /// Sets the chrono format used for `parse = "date"` fields
    pub fn with_date_format(mut self, date_format: &'a str) -> Self {
        self.date_format = date_format;
        self
    }

    /// Extracts one record from the whole document
    pub fn extract(&self, document: &Document) -> Result<Record, KagamiError> {
        if document.looks_like_json() {
            let value = document.json()?;
            return self.extract_json(&value, &document.url);
        }

        let html = document.html();
        self.extract_element(html.root_element(), &document.url)
    }

    /// Extracts one record per item matched by `item_selector`
    ///
    /// An empty document (tolerated status) yields no items. A `/`-prefixed
    /// item selector addresses an array inside a JSON document.
    pub fn extract_items(
        &self,
        document: &Document,
        item_selector: &str,
    ) -> Result<Vec<Record>, KagamiError> {
        if document.is_empty() {
            return Ok(Vec::new());
        }

        if is_json_pointer(item_selector) {
            let value = document.json()?;
            let items: &[Value] = match value.pointer(item_selector) {
                Some(Value::Array(items)) => items.as_slice(),
                _ => &[],
            };
            return items
                .iter()
                .map(|item| self.extract_json(item, &document.url))
                .collect();
        }

        let selector = compile(item_selector)?;
        let html = document.html();
        let records = html
            .select(&selector)
            .map(|element| self.extract_element(element, &document.url))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Extracts one record scoped to an HTML element
    pub fn extract_element(
        &self,
        scope: ElementRef<'_>,
        base_url: &Url,
    ) -> Result<Record, KagamiError> {
        let mut record = Record::new();

        for (name, rule) in self.rules {
            let raw = read_html_field(scope, rule)?;
            self.finish_field(&mut record, name, rule, raw, base_url)?;
        }

        Ok(record)
    }

    /// Extracts one record scoped to a JSON value
    pub fn extract_json(&self, scope: &Value, base_url: &Url) -> Result<Record, KagamiError> {
        let mut record = Record::new();

        for (name, rule) in self.rules {
            let raw = read_json_field(scope, rule);
            self.finish_field(&mut record, name, rule, raw, base_url)?;
        }

        Ok(record)
    }

    /// Applies the declared parser and the required check to raw values
    fn finish_field(
        &self,
        record: &mut Record,
        name: &str,
        rule: &FieldRule,
        raw: Vec<String>,
        base_url: &Url,
    ) -> Result<(), KagamiError> {
        let values: Vec<String> = match rule.parse {
            FieldParse::Url => raw
                .iter()
                .filter_map(|href| absolutize(href, base_url))
                .collect(),
            _ => raw,
        };

        if values.is_empty() {
            if rule.required {
                return Err(KagamiError::RequiredFieldMissing {
                    field: name.to_string(),
                    url: base_url.to_string(),
                });
            }
            match rule.parse {
                FieldParse::Status => record.insert(name, FieldValue::Status(EntryStatus::Unknown)),
                FieldParse::Ordinal => record.insert(name, FieldValue::Ordinal(0.0)),
                FieldParse::Date => record.insert(name, FieldValue::Timestamp(0)),
                _ if rule.multiple => record.insert(name, FieldValue::List(Vec::new())),
                _ => {}
            }
            return Ok(());
        }

        if rule.multiple {
            record.insert(name, FieldValue::List(values));
            return Ok(());
        }

        let first = values.into_iter().next().unwrap_or_default();
        let value = match rule.parse {
            FieldParse::Text | FieldParse::Url => FieldValue::Text(first),
            FieldParse::Status => FieldValue::Status(EntryStatus::from_label(&first)),
            FieldParse::Ordinal => {
                let ordinal = parse_ordinal(&first);
                if ordinal == 0.0 {
                    tracing::debug!("No ordinal in '{}', using 0", first);
                }
                FieldValue::Ordinal(ordinal)
            }
            FieldParse::Date => FieldValue::Timestamp(parse_date(&first, self.date_format)),
        };
        record.insert(name, value);
        Ok(())
    }
}

pub(crate) fn is_json_pointer(selector: &str) -> bool {
    selector.starts_with('/')
}

/// Compiles a CSS selector, mapping failures to `InvalidSelector`
pub(crate) fn compile(selector: &str) -> Result<Selector, KagamiError> {
    Selector::parse(selector).map_err(|e| KagamiError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Walks the fallback chain over an HTML scope
fn read_html_field(scope: ElementRef<'_>, rule: &FieldRule) -> Result<Vec<String>, KagamiError> {
    if rule.selectors.is_empty() {
        return Ok(read_element(scope, &rule.read).into_iter().collect());
    }

    for candidate in &rule.selectors {
        if is_json_pointer(candidate) {
            continue;
        }
        let selector = compile(candidate)?;
        let mut values = scope
            .select(&selector)
            .filter_map(|element| read_element(element, &rule.read));

        if rule.multiple {
            let all: Vec<String> = values.collect();
            if !all.is_empty() {
                return Ok(all);
            }
        } else if let Some(first) = values.next() {
            return Ok(vec![first]);
        }
    }

    Ok(Vec::new())
}

/// Reads one element according to the read mode; `None` when empty
fn read_element(element: ElementRef<'_>, mode: &ReadMode) -> Option<String> {
    let value = match mode {
        ReadMode::Text => collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")),
        ReadMode::OwnText => {
            let own: Vec<&str> = element
                .children()
                .filter_map(|child| child.value().as_text())
                .map(|text| &**text)
                .collect();
            collapse_whitespace(&own.join(" "))
        }
        ReadMode::Attr(name) => element.value().attr(name)?.trim().to_string(),
    };

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed text of the first `label` match inside `element`,
/// or of the element itself
pub(crate) fn element_label(element: ElementRef<'_>, label: Option<&Selector>) -> String {
    let source = label
        .and_then(|selector| element.select(selector).next())
        .unwrap_or(element);
    collapse_whitespace(&source.text().collect::<Vec<_>>().join(" "))
}

/// Walks the fallback chain over a JSON scope
fn read_json_field(scope: &Value, rule: &FieldRule) -> Vec<String> {
    if rule.selectors.is_empty() {
        return json_strings(scope);
    }

    for pointer in rule.selectors.iter().filter(|s| is_json_pointer(s)) {
        if let Some(value) = scope.pointer(pointer) {
            let mut values = json_strings(value);
            if !rule.multiple {
                values.truncate(1);
            }
            if !values.is_empty() {
                return values;
            }
        }
    }

    Vec::new()
}

fn json_strings(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Array(items) => items.iter().flat_map(json_strings).collect(),
        _ => Vec::new(),
    }
}
