//! Web scraping module for content retrieval.
//!
//! Uses reqwest for fetching and scraper for HTML parsing. Each
//! [`ContentSource`] performs one fetch-and-extract attempt; retrying is
//! left to the [`Retriever`](crate::retriever::Retriever).

use crate::config::RetrievalConfig;
use crate::extract;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::Html;
use std::time::Duration;
use thiserror::Error;

/// User-Agent string identifying this scraper
pub const USER_AGENT: &str = concat!("pagegist/", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("unexpected HTTP status: {0}")]
    BadStatus(StatusCode),
    #[error("no content found at URL")]
    NoContent,
}

/// Extracted content from a webpage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebContent {
    /// The original URL
    pub url: String,
    /// Page title
    pub title: Option<String>,
    /// Extracted text, never empty
    pub text: String,
}

/// One way of turning a URL into text.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch `url` once and extract its text
    async fn fetch(&self, url: &str) -> Result<WebContent, ScraperError>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Primary source: boilerplate-aware article extraction.
pub struct ArticleSource {
    client: Client,
}

impl ArticleSource {
    pub fn new(config: &RetrievalConfig) -> Result<Self, ScraperError> {
        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for article fetches");
        }
        let client = create_client(config, config.accept_invalid_certs)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentSource for ArticleSource {
    async fn fetch(&self, url: &str) -> Result<WebContent, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::BadStatus(status));
        }

        let html = response.text().await?;
        parse_content(url, &html, extract::extract_article)
    }

    fn name(&self) -> &'static str {
        "article"
    }
}

/// Fallback source: every visible text node of the page.
pub struct FullTextSource {
    client: Client,
    timeout: Duration,
}

impl FullTextSource {
    pub fn new(config: &RetrievalConfig) -> Result<Self, ScraperError> {
        let client = create_client(config, false)?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl ContentSource for FullTextSource {
    async fn fetch(&self, url: &str) -> Result<WebContent, ScraperError> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScraperError::BadStatus(status));
        }

        let html = response.text().await?;
        parse_content(url, &html, extract::extract_full_text)
    }

    fn name(&self) -> &'static str {
        "full-text"
    }
}

/// Create a configured HTTP client for scraping
fn create_client(
    config: &RetrievalConfig,
    accept_invalid_certs: bool,
) -> Result<Client, reqwest::Error> {
    let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);
    Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
}

/// Parse `html` and run `extractor` over it
fn parse_content(
    url: &str,
    html: &str,
    extractor: fn(&Html) -> String,
) -> Result<WebContent, ScraperError> {
    let document = Html::parse_document(html);
    let text = extractor(&document);

    if text.trim().is_empty() {
        return Err(ScraperError::NoContent);
    }

    Ok(WebContent {
        url: url.to_string(),
        title: extract::extract_title(&document),
        text,
    })
}
