//! Retrieval-augmented answering: intent-scoped retrieval, prompt assembly,
//! answer generation and the service lifecycle that ties them together.

pub mod assembler;
pub mod generator;
pub mod intent;
pub mod retriever;
pub mod service;

pub use assembler::{AnswerAssembler, FALLBACK_ANSWER};
pub use generator::{build_generator, Generator, OpenAiGenerator, PromptGenerator};
pub use intent::IntentClassifier;
pub use retriever::{Retrieval, Retriever};
pub use service::{IngestReport, QaService, QueryError, Readiness};
