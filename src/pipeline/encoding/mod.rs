//! Raw input → model-ready feature vector.
//!
//! Encoders are pure: same input and rescaler, same vector. The only
//! failure modes are a rescaler that does not fit the schema, which
//! artifact loading already rules out.

pub mod diabetes;
pub mod heart;
pub mod scaler;
pub mod schema;

pub use scaler::Rescaler;
pub use schema::{
    schema_for, FeatureField, FeatureKind, FeatureSchema, FeatureVector, DIABETES_SCHEMA,
    HEART_SCHEMA, SCHEMA_VERSION,
};

use thiserror::Error;

use crate::models::{DiabetesRawInput, Domain, HeartRawInput};

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Rescaler expects {expected} columns, got {actual}")]
    RescalerWidth { expected: usize, actual: usize },

    #[error("Invalid rescaler: {0}")]
    InvalidRescaler(String),

    #[error("Encoded {actual} features for {domain} but the schema has {expected}")]
    SchemaLength {
        domain: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A validated raw record that knows how to encode itself.
pub trait RawInput {
    const DOMAIN: Domain;

    fn encode(&self, rescaler: &Rescaler) -> Result<FeatureVector, EncodingError>;
}

impl RawInput for DiabetesRawInput {
    const DOMAIN: Domain = Domain::Diabetes;

    fn encode(&self, rescaler: &Rescaler) -> Result<FeatureVector, EncodingError> {
        diabetes::encode(self, rescaler)
    }
}

impl RawInput for HeartRawInput {
    const DOMAIN: Domain = Domain::Heart;

    fn encode(&self, rescaler: &Rescaler) -> Result<FeatureVector, EncodingError> {
        heart::encode(self, rescaler)
    }
}

/// Final length check against the schema table.
fn finish(schema: &FeatureSchema, values: Vec<f64>) -> Result<FeatureVector, EncodingError> {
    if values.len() != schema.len() {
        return Err(EncodingError::SchemaLength {
            domain: schema.domain.as_str(),
            expected: schema.len(),
            actual: values.len(),
        });
    }
    Ok(FeatureVector::new(values))
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
