//! Normalized data model shared by every source
//!
//! # Components
//!
//! - `CatalogEntry`: one title as shown in a listing or detail page
//! - `Unit`: one episode or chapter of an entry
//! - `MediaDescriptor`: a playable stream produced by the embed resolver
//! - `SearchQuery`: free text, structured filters or a deep-link path
//! - `MirrorLocator`: the JSON packing of several mirrors into a unit locator

mod catalog;
mod locator;
mod media;
mod query;
mod unit;

pub use catalog::{CatalogEntry, EntryStatus};
pub use locator::{MirrorLocator, MirrorRef};
pub use media::{MediaDescriptor, SubtitleTrack};
pub use query::{FilterSelection, FilterValue, SearchQuery, TriState, PATH_PREFIX};
pub use unit::{parse_ordinal, Unit};
