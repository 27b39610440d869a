//! Descriptive instrument metadata.

use serde::Serialize;

/// Metadata carried alongside a multisample.
///
/// Empty strings mean "not set"; creators omit such fields from their
/// output instead of writing empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    /// Free-form description.
    pub description: String,
    /// Author of the instrument.
    pub creator: String,
    /// Creation time as Unix seconds.
    pub creation_time: Option<i64>,
    /// Instrument category, e.g. "Keyboard" or "Drums".
    pub category: String,
    /// Search keywords.
    pub keywords: Vec<String>,
}

impl Metadata {
    /// Returns true if no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
            && self.creator.is_empty()
            && self.creation_time.is_none()
            && self.category.is_empty()
            && self.keywords.is_empty()
    }
}
