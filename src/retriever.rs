//! Two-phase content retrieval.
//!
//! The primary source is tried up to the policy's attempt budget; only when
//! every attempt fails does the fallback source get the same budget.

use crate::config::Config;
use crate::retry::{with_retries, RetryPolicy};
use crate::scraper::{ArticleSource, ContentSource, FullTextSource, ScraperError, WebContent};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("all retrieval attempts failed (primary: {primary}; fallback: {fallback})")]
    Exhausted {
        primary: ScraperError,
        fallback: ScraperError,
    },
}

pub struct Retriever {
    primary: Box<dyn ContentSource>,
    fallback: Box<dyn ContentSource>,
    policy: RetryPolicy,
}

impl Retriever {
    pub fn new(
        primary: Box<dyn ContentSource>,
        fallback: Box<dyn ContentSource>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            primary,
            fallback,
            policy,
        }
    }

    /// Article extraction first, full-text extraction as fallback
    pub fn from_config(config: &Config) -> Result<Self, ScraperError> {
        Ok(Self::new(
            Box::new(ArticleSource::new(&config.retrieval)?),
            Box::new(FullTextSource::new(&config.retrieval)?),
            config.retry_policy(),
        ))
    }

    /// Retrieve the text of `url`, first success wins.
    pub async fn retrieve(&self, url: &str) -> Result<WebContent, RetrievalError> {
        let primary = match with_retries(&self.policy, self.primary.name(), |_| {
            self.primary.fetch(url)
        })
        .await
        {
            Ok(content) => return Ok(content),
            Err(e) => e.into_last(),
        };

        tracing::info!(url, error = %primary, "primary extraction exhausted, falling back");

        let fallback = match with_retries(&self.policy, self.fallback.name(), |_| {
            self.fallback.fetch(url)
        })
        .await
        {
            Ok(content) => return Ok(content),
            Err(e) => e.into_last(),
        };

        tracing::warn!(url, error = %fallback, "fallback extraction exhausted");
        Err(RetrievalError::Exhausted { primary, fallback })
    }

    /// Retrieve the text of `url`, or an empty string if nothing could be extracted
    pub async fn retrieve_text(&self, url: &str) -> String {
        self.retrieve(url)
            .await
            .map(|content| content.text)
            .unwrap_or_default()
    }
}
