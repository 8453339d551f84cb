//! Prediction endpoints.
//!
//! Validation happens here; the pipeline assumes in-domain input. Model
//! inference and the narrator call are blocking, so each prediction runs
//! on the blocking pool.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{DiabetesRawInput, HeartRawInput, PredictionResult};
use crate::pipeline::encoding::RawInput;
use crate::pipeline::RiskPipeline;

/// `POST /api/predict-diabetes`
pub async fn diabetes(
    State(ctx): State<ApiContext>,
    body: Result<Json<DiabetesRawInput>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(raw) = body?;
    tracing::debug!(?raw, "Diabetes prediction request");
    raw.validate().map_err(ApiError::Validation)?;
    run(ctx.diabetes, raw).await
}

/// `POST /api/predict-heart`
pub async fn heart(
    State(ctx): State<ApiContext>,
    body: Result<Json<HeartRawInput>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(raw) = body?;
    tracing::debug!(?raw, "Heart prediction request");
    raw.validate().map_err(ApiError::Validation)?;
    run(ctx.heart, raw).await
}

async fn run<I>(pipeline: Arc<RiskPipeline>, raw: I) -> Result<Json<PredictionResult>, ApiError>
where
    I: RawInput + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || pipeline.predict(&raw)).await??;
    Ok(Json(result))
}
