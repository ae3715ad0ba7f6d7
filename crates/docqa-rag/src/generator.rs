//! Answer generation backends.
//!
//! [`PromptGenerator`] is deterministic and returns the grounded prompt itself;
//! [`OpenAiGenerator`] sends that prompt to an OpenAI-compatible
//! chat-completions endpoint. Which one runs is chosen by `generator.kind`.

use std::sync::Arc;
use std::time::Duration;

use docqa_core::config::{GeneratorConfig, GeneratorKind};
use docqa_core::error::{Error, Result};
use docqa_core::types::ScoredChunk;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assembler::{AnswerAssembler, FALLBACK_ANSWER};

pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    /// Normalize the question before retrieval. Must not fail.
    fn rewrite_query(&self, query: &str) -> String {
        query.trim().to_string()
    }

    fn generate_answer(&self, query: &str, docs: &[ScoredChunk]) -> Result<String>;
}

/// Returns the assembled prompt as the answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptGenerator {
    assembler: AnswerAssembler,
}

impl PromptGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Generator for PromptGenerator {
    fn name(&self) -> &str {
        "prompt"
    }

    fn generate_answer(&self, query: &str, docs: &[ScoredChunk]) -> Result<String> {
        Ok(self.assembler.assemble(query, docs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

/// Blocking chat-completions client. Call it from a blocking context.
pub struct OpenAiGenerator {
    model: String,
    api_base: String,
    api_key: String,
    timeout: Duration,
    assembler: AnswerAssembler,
}

impl OpenAiGenerator {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, api_base: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            model: model.into(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(timeout_secs),
            assembler: AnswerAssembler::new(),
        }
    }

    /// API key from `generator.api_key`, else `OPENAI_API_KEY`.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
            .ok_or_else(|| Error::InvalidConfig("generator.kind = openai needs generator.api_key or OPENAI_API_KEY".into()))?;
        Ok(Self::new(&config.model, api_key, &config.base_url, config.timeout_secs))
    }

    fn chat(&self, messages: &[Message]) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Generation(e.to_string()))?;
        let res = client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| Error::Generation(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            return Err(Error::Generation(format!("chat completion failed: {status} - {text}")));
        }
        let json: serde_json::Value = res.json().map_err(|e| Error::Generation(e.to_string()))?;
        if let Some(error) = json.get("error") {
            return Err(Error::Generation(format!("chat completion returned error: {error}")));
        }
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Generation("chat completion had no message content".into()))
    }
}

impl Generator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn generate_answer(&self, query: &str, docs: &[ScoredChunk]) -> Result<String> {
        if docs.is_empty() {
            return Ok(FALLBACK_ANSWER.to_string());
        }
        let prompt = self.assembler.assemble(query, docs);
        debug!(model = %self.model, context_chunks = docs.len(), "requesting completion");
        self.chat(&[Message { role: "user".to_string(), content: prompt }])
    }
}

pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn Generator>> {
    let generator: Arc<dyn Generator> = match config.kind {
        GeneratorKind::Prompt => Arc::new(PromptGenerator::new()),
        GeneratorKind::OpenAi => Arc::new(OpenAiGenerator::from_config(config)?),
    };
    info!(generator = generator.name(), "answer generator selected");
    Ok(generator)
}
