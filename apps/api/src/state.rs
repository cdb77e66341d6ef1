use std::sync::Arc;

use crate::config::Config;
use crate::extraction::DocumentExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Immutable after startup; extraction runs on blocking threads with a clone of this.
    pub extractor: Arc<DocumentExtractor>,
}
