//! HTTP API for the prediction service.
//!
//! Routes are nested under `/api/`. Handlers validate raw input, run the
//! domain pipeline on the blocking pool and serialize `PredictionResult`.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{ApiServer, ServerError};
pub use types::ApiContext;
