use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerationClient;

/// Shared application state injected into route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single generation capability. Trait object so tests swap in a
    /// scripted client.
    pub llm: Arc<dyn GenerationClient>,
    pub config: Config,
}
