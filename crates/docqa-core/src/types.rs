//! Domain types shared by the chunker, the vector store and the retriever.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Loader-provided metadata beyond the typed fields (e.g. `file_name`).
pub type Extra = BTreeMap<String, String>;

/// Coarse document category used to scope retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Hr,
    It,
    Ops,
    #[default]
    General,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [Self::Hr, Self::It, Self::Ops, Self::General];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hr => "HR",
            Self::It => "IT",
            Self::Ops => "OPS",
            Self::General => "GENERAL",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::error::Error::NotFound(format!("document type '{s}'")))
    }
}

/// Ordered keyword groups; the first group with a substring hit wins.
///
/// Matching is case-insensitive. Text that matches no group is `GENERAL`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRules(pub &'static [(DocumentType, &'static [&'static str])]);

impl KeywordRules {
    pub fn classify(&self, text: &str) -> DocumentType {
        let lowered = text.to_lowercase();
        self.0
            .iter()
            .find(|(_, terms)| terms.iter().any(|t| lowered.contains(t)))
            .map_or(DocumentType::General, |(doc_type, _)| *doc_type)
    }
}

/// Per-chunk metadata. Every chunk owns its own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Metadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look a field up by its string key, the way metadata filters address it.
    ///
    /// `page` renders as a decimal string and `document_type` as its upper-case
    /// name; any other key is read from `extra`.
    pub fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "source" => Some(Cow::Borrowed(self.source.as_str())),
            "page" => self.page.map(|p| Cow::Owned(p.to_string())),
            "document_type" => Some(Cow::Borrowed(self.document_type.as_str())),
            other => self.extra.get(other).map(|v| Cow::Borrowed(v.as_str())),
        }
    }
}

/// One unit handed over by text extraction: a PDF page or a whole text file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub text: String,
    pub metadata: Metadata,
}

/// A bounded word window of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata }
    }

    pub fn document_type(&self) -> DocumentType {
        self.metadata.document_type
    }
}

/// A search hit. `score` is the cosine similarity in `[-1, 1]`; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
