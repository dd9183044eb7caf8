//! SummaryRecord - the structured result emitted for every run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Summary text of the record emitted when no content could be retrieved.
pub const FETCH_FAILED_SUMMARY: &str = "Error fetching or extracting content";

/// Summary text of the record emitted when the model output could not be decoded.
pub const PARSE_FAILED_SUMMARY: &str = "Error parsing summary";

/// Structured summary of a single webpage.
///
/// Keys serialise in PascalCase and in declaration order. Lower-case keys are
/// accepted when decoding model output, anything else is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SummaryRecord {
    /// The summarised URL. Absent on sentinel records.
    #[serde(
        rename = "From",
        alias = "from",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub from: Option<String>,
    /// One paragraph of three factual sentences
    #[serde(rename = "Summary", alias = "summary")]
    pub summary: String,
    /// Up to five keywords, most relevant first
    #[serde(rename = "Keywords", alias = "keywords")]
    pub keywords: Vec<String>,
    /// Source of the summarised content
    #[serde(rename = "References", alias = "references")]
    pub references: String,
}

impl SummaryRecord {
    /// Sentinel for a run where retrieval produced no text
    pub fn fetch_failed(url: &str) -> Self {
        Self::sentinel(FETCH_FAILED_SUMMARY, url)
    }

    /// Sentinel for a run where the model output could not be decoded
    pub fn parse_failed(url: &str) -> Self {
        Self::sentinel(PARSE_FAILED_SUMMARY, url)
    }

    fn sentinel(summary: &str, url: &str) -> Self {
        Self {
            from: None,
            summary: summary.to_string(),
            keywords: Vec::new(),
            references: url.to_string(),
        }
    }

    /// Check if this record is one of the two failure sentinels
    pub fn is_sentinel(&self) -> bool {
        self.from.is_none()
            && self.keywords.is_empty()
            && (self.summary == FETCH_FAILED_SUMMARY || self.summary == PARSE_FAILED_SUMMARY)
    }

    /// Render as pretty-printed JSON, non-ASCII left unescaped
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
