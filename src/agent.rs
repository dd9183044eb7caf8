//! Summarization agent.
//!
//! Builds the summarization prompt, calls a [`Generator`] once with the fixed
//! decoding configuration and decodes the reply into a [`SummaryRecord`].
//! Replies that do not decode become the "Error parsing summary" sentinel.

pub use crate::summary::SummaryRecord;

use crate::config::ConfigError;
use crate::llm::{GenerationConfig, Generator};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM returned no candidates")]
    EmptyResponse,
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

pub struct Summarizer<G> {
    generator: G,
    config: GenerationConfig,
}

impl<G: Generator> Summarizer<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            config: GenerationConfig::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn generator(&self) -> &G {
        &self.generator
    }

    /// Summarize `text` taken from `url`.
    ///
    /// Only provider failures are returned as errors; an undecodable reply
    /// yields [`SummaryRecord::parse_failed`].
    pub async fn summarize(&self, text: &str, url: &str) -> Result<SummaryRecord, AgentError> {
        let prompt = build_prompt(url, text.trim());
        let raw = self.generator.generate(&prompt, &self.config).await?;

        match parse_summary(&raw) {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!(url, error = %e, "model output could not be decoded");
                Ok(SummaryRecord::parse_failed(url))
            }
        }
    }
}

/// Build the prompt including rules, output shape and content
pub fn build_prompt(url: &str, body: &str) -> String {
    let url_json = serde_json::Value::from(url).to_string();
    format!(
        r#"You are a professional summarizer. Summarize the content of the webpage at {url}.

Rules:
- Write exactly one paragraph containing exactly three sentences.
- Be strictly factual and concise. Do not add information that is not in the content.
- Pick up to five keywords that best describe the content.
- Respond with valid JSON only, shaped exactly like this:
{{
  "From": {url_json},
  "Summary": "<one paragraph of three sentences>",
  "Keywords": ["<keyword1>", "<keyword2>", "<keyword3>", "<keyword4>", "<keyword5>"],
  "References": {url_json}
}}

Do not include any markdown formatting, code blocks, or explanations. Only output the raw JSON object.

---

{body}"#
    )
}

/// Decode a model reply into a record, rejecting anything off-schema
pub fn parse_summary(raw: &str) -> Result<SummaryRecord, AgentError> {
    let cleaned = strip_markdown_json(raw);

    let record: SummaryRecord = serde_json::from_str(cleaned)
        .map_err(|e| AgentError::ParseError(format!("{}: {}", e, cleaned)))?;

    if record.summary.trim().is_empty() {
        return Err(AgentError::ParseError("summary is empty".to_string()));
    }

    Ok(record)
}

/// Strip markdown code block wrappers from JSON response
fn strip_markdown_json(text: &str) -> &str {
    let trimmed = text.trim();

    // Remove ```json ... ```, ```JSON ... ``` or ``` ... ```
    if let Some(without_prefix) = trimmed.strip_prefix("```") {
        let without_prefix = match without_prefix.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &without_prefix[4..],
            _ => without_prefix,
        };
        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim();
        }
    }

    trimmed
}
