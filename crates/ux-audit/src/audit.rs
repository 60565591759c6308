//! Audit orchestration: fetch, extract, narrate, score.

use crate::extract::extract;
use crate::fetch::{normalize_url, Fetcher};
use crate::narrative::Narrator;
use crate::rules::evaluate;
use crate::types::{AuditError, AuditReport, AuditResult};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs one audit end to end. Holds no per-request state.
#[derive(Clone)]
pub struct Auditor {
    fetcher: Fetcher,
    narrator: Narrator,
}

impl Auditor {
    pub fn new(fetcher: Fetcher, narrator: Narrator) -> Self {
        Self { fetcher, narrator }
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    /// Audit the page at `url`.
    ///
    /// Only a blank URL or a failed fetch is an error; a narrative failure
    /// just yields a placeholder in [`AuditReport::narrative`].
    pub async fn run(&self, url: &str) -> AuditResult<AuditReport> {
        if url.trim().is_empty() {
            return Err(AuditError::EmptyUrl);
        }
        let url = normalize_url(url);
        let started = Instant::now();

        let fetched = self.fetcher.fetch(&url).await.map_err(|e| {
            warn!(%url, error = %e, "fetch failed");
            AuditError::from(e)
        })?;
        debug!(%url, final_url = %fetched.final_url, bytes = fetched.body.len(), "page fetched");

        let page = extract(&fetched.body, &url);
        debug!(%url, words = page.word_count, "signals extracted");

        let narrative = self.narrator.narrate(&page.text).await;
        let evaluation = evaluate(&page);

        info!(
            %url,
            score = evaluation.score,
            findings = evaluation.findings.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "audit complete"
        );

        Ok(AuditReport {
            url,
            score: evaluation.score,
            findings: evaluation.findings,
            narrative,
        })
    }
}
