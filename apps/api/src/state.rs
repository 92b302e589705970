use std::sync::Arc;

use crate::config::Config;
use crate::matching::CareerMatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; queries only ever borrow it.
    pub matcher: Arc<CareerMatcher>,
    pub config: Config,
}
