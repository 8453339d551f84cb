//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::models::Domain;
use crate::pipeline::encoding::schema::SCHEMA_VERSION;

#[derive(Serialize)]
pub struct DomainStatus {
    pub domain: Domain,
    pub features: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub schema_version: u32,
    pub narrator_enabled: bool,
    pub domains: Vec<DomainStatus>,
}

/// `GET /api/health`: liveness plus the loaded model shapes.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let domains = [&ctx.diabetes, &ctx.heart]
        .into_iter()
        .map(|pipeline| DomainStatus {
            domain: pipeline.domain(),
            features: pipeline.artifacts().schema.len(),
        })
        .collect();

    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        schema_version: SCHEMA_VERSION,
        narrator_enabled: ctx.narrator_enabled,
        domains,
    })
}
