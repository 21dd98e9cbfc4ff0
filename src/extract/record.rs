use crate::model::EntryStatus;
use std::collections::BTreeMap;

/// A parsed field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Status(EntryStatus),
    Ordinal(f64),
    /// Epoch milliseconds, `0` when unknown
    Timestamp(i64),
}

/// Flat record produced by applying a rule set to a document or item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text of a field; the first element for list fields
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name)? {
            FieldValue::Text(text) => Some(text.as_str()),
            FieldValue::List(items) => items.first().map(String::as_str),
            _ => None,
        }
    }

    /// Every value of a field; a text field yields a single element
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(text)) => vec![text.clone()],
            _ => Vec::new(),
        }
    }

    pub fn status(&self, name: &str) -> EntryStatus {
        match self.fields.get(name) {
            Some(FieldValue::Status(status)) => *status,
            Some(FieldValue::Text(text)) => EntryStatus::from_label(text),
            _ => EntryStatus::Unknown,
        }
    }

    pub fn ordinal(&self, name: &str) -> f64 {
        match self.fields.get(name) {
            Some(FieldValue::Ordinal(ordinal)) => *ordinal,
            _ => 0.0,
        }
    }

    pub fn timestamp(&self, name: &str) -> i64 {
        match self.fields.get(name) {
            Some(FieldValue::Timestamp(millis)) => *millis,
            _ => 0,
        }
    }
}
