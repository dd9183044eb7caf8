//! Retrieve-then-summarize pipeline for a single URL.

use crate::agent::{AgentError, Summarizer};
use crate::llm::Generator;
use crate::retriever::Retriever;
use crate::summary::SummaryRecord;

/// Retrieve `url` and summarize it.
///
/// When retrieval yields no text the model is never called and the
/// fetch sentinel is returned instead.
pub async fn run<G: Generator>(
    retriever: &Retriever,
    summarizer: &Summarizer<G>,
    url: &str,
) -> Result<SummaryRecord, AgentError> {
    let content = match retriever.retrieve(url).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(url, error = %e, "no content retrieved, skipping summarization");
            return Ok(SummaryRecord::fetch_failed(url));
        }
    };

    tracing::info!(url, chars = content.text.len(), "summarizing extracted content");
    let record = summarizer.summarize(&content.text, url).await?;
    if record.is_sentinel() {
        tracing::info!(url, summary = %record.summary, "emitting sentinel record");
    } else {
        tracing::info!(url, keywords = record.keywords.len(), "summary ready");
    }
    Ok(record)
}
