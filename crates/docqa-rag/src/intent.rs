use docqa_core::types::{DocumentType, KeywordRules};

/// Query keywords, checked in order; the first group with a hit wins.
pub const QUERY_RULES: KeywordRules = KeywordRules(&[
    (DocumentType::Hr, &["policy", "leave", "compliance", "hr"]),
    (DocumentType::It, &["incident", "outage", "failure"]),
    (DocumentType::Ops, &["alarm", "compressor", "pump"]),
]);

/// Maps a question to the document type retrieval is scoped to.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, query: &str) -> DocumentType {
        QUERY_RULES.classify(query)
    }
}
