//! Server lifecycle: assemble the pipelines, bind, serve, shut down.
//!
//! Pattern: bind → spawn background task → return handle with shutdown
//! channel. `serve` drives that handle from Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::{api_router, cors_layer};
use crate::api::types::ApiContext;
use crate::config::{NarratorConfig, ServiceConfig};
use crate::models::Domain;
use crate::pipeline::artifacts::{load_domain, ArtifactError};
use crate::pipeline::narrator::chat::ChatCompletionsNarrator;
use crate::pipeline::narrator::{DisabledNarrator, Narrator, NarratorError};
use crate::pipeline::RiskPipeline;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to load model artifacts: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Invalid CLIENT_URL origin: {0:?}")]
    InvalidOrigin(String),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl ApiServer {
    /// Signal graceful shutdown. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait for the server task to exit.
    pub async fn stopped(self) {
        if let Err(e) = self.handle.await {
            tracing::error!("API server task failed: {e}");
        }
    }
}

/// Pick the narrator for this process: the chat-completions client when a
/// key is configured, otherwise a disabled narrator.
pub fn build_narrator(config: &NarratorConfig) -> Arc<dyn Narrator> {
    match ChatCompletionsNarrator::new(config) {
        Ok(narrator) => {
            tracing::info!(model = narrator.model(), "Narrator enabled");
            Arc::new(narrator)
        }
        Err(NarratorError::NotConfigured) => {
            tracing::info!("GROQ_API_KEY not set, explanations use fallback text");
            Arc::new(DisabledNarrator)
        }
        Err(e) => {
            tracing::warn!("Narrator unavailable, explanations use fallback text: {e}");
            Arc::new(DisabledNarrator)
        }
    }
}

/// Load both artifact bundles and wire the two pipelines.
///
/// Must run outside the async runtime: the narrator owns a blocking HTTP
/// client.
///
/// # Errors
/// Any artifact failing to load or validate. Startup must not continue.
pub fn build_context(config: &ServiceConfig) -> Result<ApiContext, ServerError> {
    let diabetes = Arc::new(load_domain(&config.models_dir, Domain::Diabetes)?);
    let heart = Arc::new(load_domain(&config.models_dir, Domain::Heart)?);
    tracing::info!(
        models_dir = %config.models_dir.display(),
        diabetes_features = diabetes.feature_names.len(),
        heart_features = heart.feature_names.len(),
        "Model artifacts loaded"
    );

    let narrator = build_narrator(&config.narrator);
    let narrator_enabled = narrator.is_enabled();
    Ok(ApiContext::new(
        RiskPipeline::new(diabetes, narrator.clone()),
        RiskPipeline::new(heart, narrator),
        narrator_enabled,
    ))
}

/// Build the router for a context, applying the configured CORS origin.
///
/// # Errors
/// `CLIENT_URL` is not a valid origin header value.
pub fn build_router(ctx: ApiContext, client_url: Option<&str>) -> Result<Router, ServerError> {
    let cors = match client_url {
        Some(origin) => {
            Some(cors_layer(origin).map_err(|_| ServerError::InvalidOrigin(origin.to_string()))?)
        }
        None => None,
    };
    Ok(api_router(ctx, cors))
}

/// Bind `addr` and serve `app` in a background task.
pub async fn start_server_on(app: Router, addr: SocketAddr) -> Result<ApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        handle,
    })
}

/// Serve until Ctrl-C.
pub async fn serve(ctx: ApiContext, config: &ServiceConfig) -> Result<(), ServerError> {
    let app = build_router(ctx, config.client_url.as_deref())?;
    let mut server = start_server_on(app, config.bind_addr).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    server.shutdown();
    server.stopped().await;
    Ok(())
}
