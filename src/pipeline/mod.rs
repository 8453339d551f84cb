pub mod artifacts;
pub mod attribution;
pub mod encoding;
pub mod model;
pub mod narrator;
pub mod orchestrator;

pub use orchestrator::{PipelineError, RiskPipeline};
