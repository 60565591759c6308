//! UX Optimizer — single-page UX/SEO audit: fetch, extract, score, narrate.

pub mod audit;
pub mod extract;
pub mod fetch;
pub mod gemini;
pub mod narrative;
pub mod rules;
pub mod types;

pub use audit::Auditor;
pub use extract::extract;
pub use fetch::{normalize_url, Fetcher, DEFAULT_FETCH_TIMEOUT};
pub use gemini::{GeminiClient, GeminiConfig};
pub use narrative::{Narrator, TextGenerator};
pub use rules::{evaluate, Evaluation, RULES};
pub use types::*;
