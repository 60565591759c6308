//! HTTP REST API for UX Optimizer.
//!
//! `POST /analyze` always answers with a structurally valid body: the full
//! report, or a zero-score failure carrying the error message.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use ux_audit::{
    AuditReport, AuditRequest, AuditResult, Auditor, Fetcher, GeminiClient, GeminiConfig, Narrator,
    TextGenerator,
};

use crate::config::ServerConfig;

/// Reported by `GET /`.
pub const SERVICE_NAME: &str = "UX Optimizer API";

/// Severity attached to every failure critique.
pub const FAILURE_SEVERITY: &str = "High";

/// Shared state for all handlers.
pub struct AppState {
    pub auditor: Auditor,
}

impl AppState {
    pub fn new(auditor: Auditor) -> Self {
        Self { auditor }
    }

    /// Build the auditor from configuration.
    ///
    /// With an API key the model is probed once here and stays fixed.
    pub async fn from_config(config: &ServerConfig) -> Self {
        let narrator = match &config.api_key {
            Some(key) => {
                info!("Gemini API key loaded");
                let gemini = GeminiConfig {
                    api_key: key.clone(),
                    base_url: config.gemini_base_url.clone(),
                    timeout: config.narrative_timeout,
                };
                let client = GeminiClient::connect(gemini).await;
                info!(model = client.model(), "narrative model selected");
                Narrator::new(Arc::new(client))
            }
            None => {
                warn!("no Gemini API key, narratives disabled");
                Narrator::disabled()
            }
        };
        Self::new(Auditor::new(Fetcher::new(config.fetch_timeout), narrator))
    }
}

/// Body of a failed audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAudit {
    /// Request URL as received.
    pub url: String,
    pub score_global: u8,
    pub critiques: Vec<ErrorCritique>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCritique {
    pub titre: String,
    pub severite: String,
}

/// Wire shape of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Report(AuditReport),
    Failed(FailedAudit),
}

impl AnalyzeResponse {
    /// Map an audit outcome to its response body.
    pub fn from_result(request_url: &str, result: AuditResult<AuditReport>) -> Self {
        match result {
            Ok(report) => Self::Report(report),
            Err(e) => Self::Failed(FailedAudit {
                url: request_url.to_string(),
                score_global: 0,
                critiques: vec![ErrorCritique {
                    titre: e.to_string(),
                    severite: FAILURE_SEVERITY.to_string(),
                }],
            }),
        }
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `addr` until the process exits.
pub async fn start(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST API listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn root() -> Json<Value> {
    Json(serde_json::json!({
        "status": "online",
        "service": SERVICE_NAME,
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.auditor.narrator().model(),
    }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AuditRequest>,
) -> Json<AnalyzeResponse> {
    let result = state.auditor.run(&request.url).await;
    Json(AnalyzeResponse::from_result(&request.url, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ux_audit::{AuditError, FetchError};

    #[test]
    fn test_failure_shape() {
        let resp = AnalyzeResponse::from_result(
            "example.com/missing",
            Err(AuditError::Fetch(FetchError::Status(404))),
        );
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "url": "example.com/missing",
                "score_global": 0,
                "critiques": [{"titre": "Erreur 404", "severite": "High"}]
            })
        );
    }

    #[test]
    fn test_network_failure_carries_message() {
        let resp = AnalyzeResponse::from_result(
            "https://nowhere.invalid",
            Err(AuditError::Fetch(FetchError::Network("dns error".into()))),
        );
        match resp {
            AnalyzeResponse::Failed(failed) => {
                assert_eq!(failed.critiques[0].titre, "dns error");
                assert_eq!(failed.score_global, 0);
            }
            AnalyzeResponse::Report(_) => panic!("expected failure"),
        }
    }
}
