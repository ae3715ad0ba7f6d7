use std::collections::BTreeMap;

use docqa_core::types::{DocumentType, Metadata};
use serde::{Deserialize, Serialize};

/// Conjunction of exact key/value matches against chunk metadata.
///
/// An empty filter matches everything. A key the chunk does not carry never
/// matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter(BTreeMap<String, String>);

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on `document_type` only.
    pub fn document_type(doc_type: DocumentType) -> Self {
        Self::new().with("document_type", doc_type.as_str())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.0
            .iter()
            .all(|(key, want)| metadata.get(key).is_some_and(|have| have == want.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(MetadataFilter::new().matches(&Metadata::new("a.pdf")));
    }

    #[test]
    fn all_pairs_must_match() {
        let meta = Metadata::new("a.pdf").with_page(3).with_document_type(DocumentType::Ops);
        let f = MetadataFilter::document_type(DocumentType::Ops).with("page", "3");
        assert!(f.matches(&meta));
        assert!(!f.clone().with("page", "4").matches(&meta));
        assert!(!MetadataFilter::document_type(DocumentType::Hr).matches(&meta));
    }

    #[test]
    fn missing_key_never_matches() {
        let meta = Metadata::new("a.txt");
        assert!(!MetadataFilter::new().with("page", "0").matches(&meta));
        assert!(!MetadataFilter::new().with("file_name", "a.txt").matches(&meta));
    }
}
