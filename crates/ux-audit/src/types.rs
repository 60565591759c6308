//! Core data types for page signals, findings, and audit reports.

use serde::{Deserialize, Serialize};

/// Incoming audit request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRequest {
    pub url: String,
}

/// Signals extracted once from a fetched page.
///
/// Built by [`crate::extract::extract`] and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Visible text, one space between text nodes.
    pub text: String,
    /// First `<title>` text, trimmed. `None` when absent or blank.
    pub title: Option<String>,
    /// All `<h1>` texts in document order.
    pub headings_h1: Vec<String>,
    pub headings_h2_count: usize,
    pub paragraph_count: usize,
    /// Whitespace-delimited tokens in `text`.
    pub word_count: usize,
    pub images: Vec<ImageSignal>,
    pub links_count: usize,
    /// Whether the normalized request URL uses https.
    pub has_https: bool,
    /// `lang` attribute of the root `<html>` element.
    pub lang_attr: Option<String>,
    pub has_og_image: bool,
    pub has_viewport_meta: bool,
    /// `<button>` elements plus `<a>` elements classed `btn`, `button` or `cta`.
    pub cta_elements_count: usize,
}

impl ExtractedPage {
    /// Number of `<img>` elements without an `alt` attribute.
    pub fn images_missing_alt(&self) -> usize {
        self.images.iter().filter(|i| !i.has_alt).count()
    }
}

/// One `<img>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSignal {
    /// The attribute is present (an empty `alt=""` still counts).
    pub has_alt: bool,
}

/// Verdict severity of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Danger,
}

/// One rule's structured verdict.
///
/// Field names on the wire are the short keys the dashboard reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "cat")]
    pub category: String,
    pub label: String,
    pub status: Status,
    #[serde(rename = "val")]
    pub value: String,
    #[serde(rename = "expl")]
    pub explanation: String,
    #[serde(rename = "reco")]
    pub recommendation: String,
}

/// Full result of one audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Normalized URL that was fetched.
    pub url: String,
    /// Bounded to `0..=100`.
    #[serde(rename = "score_global")]
    pub score: u8,
    #[serde(rename = "critiques")]
    pub findings: Vec<Finding>,
    /// HTML fragment, or a placeholder message when no narrative was produced.
    #[serde(rename = "ai_analysis")]
    pub narrative: String,
}

/// Page fetch failure. Terminal for the audit.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with anything other than 200.
    #[error("Erreur {0}")]
    Status(u16),

    /// DNS, TLS, timeout, refused connection, or a truncated body.
    #[error("{0}")]
    Network(String),
}

/// Failures that abort an audit before any finding is produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("URL vide")]
    EmptyUrl,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Failures of the hosted text-completion capability.
///
/// Never surfaced to API callers; the narrator swaps them for a placeholder.
#[derive(thiserror::Error, Debug)]
pub enum NarrativeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Convenience result type for audits.
pub type AuditResult<T> = Result<T, AuditError>;

/// Convenience result type for narrative generation.
pub type NarrativeResult<T> = Result<T, NarrativeError>;
