use docqa_core::types::ScoredChunk;

/// Returned whenever retrieval found no context.
pub const FALLBACK_ANSWER: &str = "Answer not available in the selected document.";

/// Builds the grounded prompt handed to the generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerAssembler;

impl AnswerAssembler {
    pub fn new() -> Self {
        Self
    }

    /// `[TYPE] text` per chunk, separated by blank lines, in retrieval order.
    pub fn context(&self, docs: &[ScoredChunk]) -> String {
        docs.iter()
            .map(|d| format!("[{}] {}", d.chunk.document_type(), d.chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn assemble(&self, query: &str, docs: &[ScoredChunk]) -> String {
        if docs.is_empty() {
            return FALLBACK_ANSWER.to_string();
        }
        format!(
            "\nAnswer ONLY using the context below.\n\nQuestion:\n{query}\n\nContext:\n{}\n",
            self.context(docs)
        )
    }
}
