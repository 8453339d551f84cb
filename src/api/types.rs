//! Shared types for the API layer.

use std::sync::Arc;

use crate::pipeline::RiskPipeline;

/// Shared context for all API routes and middleware.
///
/// Both pipelines hold their artifacts behind `Arc`; cloning the context
/// per request is cheap and never copies model data.
#[derive(Clone)]
pub struct ApiContext {
    pub diabetes: Arc<RiskPipeline>,
    pub heart: Arc<RiskPipeline>,
    pub narrator_enabled: bool,
}

impl ApiContext {
    pub fn new(diabetes: RiskPipeline, heart: RiskPipeline, narrator_enabled: bool) -> Self {
        Self {
            diabetes: Arc::new(diabetes),
            heart: Arc::new(heart),
            narrator_enabled,
        }
    }
}
