//! The document header: format version plus root element attributes.

use indexmap::IndexMap;

/// Metadata gathered from a document's root element.
///
/// Keeps every root attribute in document order, alongside the format
/// version the parser validated. A header is published exactly once
/// per document, before any entity buffer, so consumers can branch on
/// `generator` or bounding-box attributes up front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    version: String,
    attributes: IndexMap<String, String>,
}

impl Header {
    /// An empty header with no version and no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// The validated format version, e.g. `"0.6"`. Empty on a header
    /// that was published before any root element was seen.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Record the validated format version.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Look up a root attribute by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Insert or replace a root attribute, preserving first-insertion
    /// order.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Iterate the attributes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of recorded attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether no attributes were recorded.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
