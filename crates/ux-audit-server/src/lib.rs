//! UX Optimizer server — HTTP API and CLI over the `ux-audit` engine.

pub mod config;
pub mod rest;

pub use config::ServerConfig;
pub use rest::{router, AnalyzeResponse, AppState};
