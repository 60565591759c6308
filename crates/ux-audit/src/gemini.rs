//! Google Gemini client for narrative generation.
//!
//! The model is chosen once by [`select_model`] at startup and then fixed for
//! the life of the [`GeminiClient`].

use crate::narrative::TextGenerator;
use crate::types::{NarrativeError, NarrativeResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Public Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Used when probing fails or finds no flash model.
pub const DEFAULT_MODEL: &str = "models/gemini-1.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Printed in place of the API key by `Debug` impls.
pub const REDACTED: &str = "<redacted>";

/// Connection settings for the Gemini API.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    /// `None` leaves the call unbounded.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    fn http_client(&self) -> Client {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().unwrap_or_default()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Pick the first `generateContent` model whose name contains "flash".
///
/// Any probe failure, or no match, yields [`DEFAULT_MODEL`].
pub async fn select_model(config: &GeminiConfig) -> String {
    match list_models(config).await {
        Ok(models) => models
            .into_iter()
            .find(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|g| g == "generateContent")
                    && m.name.contains("flash")
            })
            .map(|m| m.name)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        Err(e) => {
            warn!(error = %e, "model probe failed, using {DEFAULT_MODEL}");
            DEFAULT_MODEL.to_string()
        }
    }
}

async fn list_models(config: &GeminiConfig) -> NarrativeResult<Vec<ModelInfo>> {
    let client = config.http_client();
    let mut models = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut request = client
            .get(config.url("models"))
            .header(API_KEY_HEADER, &config.api_key);
        if let Some(token) = &page_token {
            request = request.query(&[("pageToken", token)]);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: ModelList = response.json().await?;
        debug!(count = list.models.len(), "listed models");
        models.extend(list.models);

        match list.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(models)
}

/// Text generator backed by one Gemini model.
pub struct GeminiClient {
    config: GeminiConfig,
    model: String,
    client: Client,
}

impl GeminiClient {
    /// Client for an already selected model.
    pub fn new(config: GeminiConfig, model: impl Into<String>) -> Self {
        let client = config.http_client();
        Self {
            config,
            model: model.into(),
            client,
        }
    }

    /// Probe for the best model, then build the client.
    pub async fn connect(config: GeminiConfig) -> Self {
        let model = select_model(&config).await;
        Self::new(config, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> NarrativeResult<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.config.url(&format!("{}:generateContent", self.model)))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: GenerateResponse = response.json().await?;
        let text = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(NarrativeError::EmptyResponse);
        }
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
