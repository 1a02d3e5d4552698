//! Batch driver – turns a list of video links into finished documents.
//!
//! Link validation and summarisation are external services; they are reached
//! through the [`VideoValidator`] and [`Summarizer`] traits and never
//! implemented here. Every item owns its own document, so items run in
//! parallel on the rayon pool and one failure never touches its siblings.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Error;
use crate::pipeline::{generate_document, Artifact, LayoutOptions};

/// Text a summarizer returns when it found nothing to summarise.
pub const INSUFFICIENT_INFORMATION_MARKER: &str =
    "The AI could not find enough information to generate a summary.";

/// Outcome of checking a video link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub title: Option<String>,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn valid(title: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            title: Some(title.into()),
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            title: None,
            error: Some(error.into()),
        }
    }
}

/// Requested depth of a summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Comprehensive,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    /// The service found too little material; carries its explanation.
    #[error("{0}")]
    InsufficientInformation(String),

    #[error("AI model returned an empty response.")]
    EmptyResponse,

    #[error("Failed to analyze video. Details: {0}")]
    Service(String),
}

/// Checks that a link points at an existing, public video.
pub trait VideoValidator: Sync {
    fn validate(&self, url: &str) -> ValidationResult;
}

/// Produces a markdown-flavoured summary for a video.
pub trait Summarizer: Sync {
    fn summarize(&self, url: &str, title: &str, length: SummaryLength) -> Result<String, SummaryError>;
}

/// Whether a summary is really the service's "nothing found" reply.
pub fn is_insufficient_information(text: &str) -> bool {
    text.contains(INSUFFICIENT_INFORMATION_MARKER)
}

/// Apply the summarizer contract to a raw reply: empty replies and
/// "nothing found" replies become errors.
pub fn check_summary(text: String) -> Result<String, SummaryError> {
    if text.trim().is_empty() {
        return Err(SummaryError::EmptyResponse);
    }
    if is_insufficient_information(&text) {
        return Err(SummaryError::InsufficientInformation(text));
    }
    Ok(text)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub url: String,
    #[serde(default)]
    pub length: SummaryLength,
}

impl BatchItem {
    pub fn new(url: impl Into<String>, length: SummaryLength) -> Self {
        Self {
            url: url.into(),
            length,
        }
    }
}

/// Why one batch item produced no document.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Invalid video link: {0}")]
    InvalidLink(String),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Document(#[from] Error),
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub url: String,
    pub result: Result<Artifact, BatchError>,
}

/// Validate, summarise and compose every item. Outcomes keep input order.
pub fn run_batch(
    items: &[BatchItem],
    validator: &dyn VideoValidator,
    summarizer: &dyn Summarizer,
    options: &LayoutOptions,
) -> Vec<BatchOutcome> {
    items
        .par_iter()
        .map(|item| BatchOutcome {
            url: item.url.clone(),
            result: process_item(item, validator, summarizer, options),
        })
        .collect()
}

fn process_item(
    item: &BatchItem,
    validator: &dyn VideoValidator,
    summarizer: &dyn Summarizer,
    options: &LayoutOptions,
) -> Result<Artifact, BatchError> {
    let validation = validator.validate(&item.url);
    if !validation.is_valid {
        let reason = validation
            .error
            .unwrap_or_else(|| "Video not found. Please check the URL.".to_string());
        log::warn!("skipping {}: {reason}", item.url);
        return Err(BatchError::InvalidLink(reason));
    }

    // A valid link without metadata still gets a document, named after the URL.
    let title = validation
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| item.url.clone());

    let summary = summarizer
        .summarize(&item.url, &title, item.length)
        .and_then(check_summary)?;

    let artifact = generate_document(&title, &summary, options)?;
    log::debug!("{} -> {} ({} pages)", item.url, artifact.filename, artifact.page_count());
    Ok(artifact)
}

/// Compose many `(title, body)` documents concurrently.
pub fn generate_documents(
    documents: &[(String, String)],
    options: &LayoutOptions,
) -> Vec<crate::error::Result<Artifact>> {
    documents
        .par_iter()
        .map(|(title, body)| generate_document(title, body, options))
        .collect()
}
