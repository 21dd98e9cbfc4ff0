//! Declarative field extraction
//!
//! A rule set maps field names to an ordered fallback chain of selectors.
//! The first selector yielding non-empty content wins. Optional fields that
//! are absent never fail; parsed fields fall back to their unknown sentinel.
//! Only a field marked `required` fails, with `RequiredFieldMissing`, which
//! signals that the page layout changed.
//!
//! Selectors are CSS for HTML documents. A selector beginning with `/` is a
//! JSON pointer and applies to JSON documents.

mod date;
mod record;
mod rules;

pub use date::{parse_date, parse_date_at};
pub use record::{FieldValue, Record};
pub(crate) use rules::{compile, element_label, is_json_pointer};
pub use rules::{extract, has_marker, Extractor};
