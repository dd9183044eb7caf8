//! # pagegist
//!
//! Fetches a single webpage, extracts its main text and asks a generative
//! model for a three-sentence summary with keywords, emitted as JSON.
//!
//! ## Pipeline
//!
//! - **Retrieval**: boilerplate-aware article extraction with retries, then
//!   crude full-text extraction with retries if that fails
//! - **Summarization**: one model call with a fixed decoding configuration,
//!   decoded into a [`SummaryRecord`]
//! - **Failure is data**: fetch and decode failures produce sentinel records
//!   rather than errors

pub mod agent;
pub mod config;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod retriever;
pub mod retry;
pub mod scraper;
pub mod summary;

pub use agent::Summarizer;
pub use config::Config;
pub use llm::{GeminiClient, GenerationConfig, Generator};
pub use retriever::Retriever;
pub use retry::RetryPolicy;
pub use summary::SummaryRecord;
