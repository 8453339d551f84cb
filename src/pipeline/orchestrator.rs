//! Prediction orchestrator: encode → predict → attribute → narrate.
//!
//! Only encoding and prediction can fail a request. Attribution and
//! narration are explanation extras: their failures are logged and replaced
//! by an empty contributor list or the domain's fallback text.

use std::sync::Arc;

use thiserror::Error;

use crate::models::{round_probability, Domain, PredictionResult, RankedContributor};
use crate::pipeline::artifacts::ArtifactBundle;
use crate::pipeline::attribution::{
    self, ImpactWording, DEFAULT_TOP_N, DIABETES_WORDING, HEART_WORDING,
};
use crate::pipeline::encoding::{EncodingError, FeatureVector, RawInput};
use crate::pipeline::model::{ModelError, Prediction};
use crate::pipeline::narrator::{NarrativeRequest, Narrator};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{found} input sent to the {expected} pipeline")]
    DomainMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ModelError),

    #[error("Predictor returned an out-of-range result: {0}")]
    InvalidPrediction(String),
}

/// Per-domain wording of the response.
#[derive(Debug)]
pub struct DomainProfile {
    pub domain: Domain,
    pub positive_label: &'static str,
    pub negative_label: &'static str,
    pub positive_risk: &'static str,
    pub negative_risk: &'static str,
    pub wording: ImpactWording,
    /// Explanation returned whenever no narrative is available.
    pub fallback_explanation: &'static str,
}

pub static DIABETES_PROFILE: DomainProfile = DomainProfile {
    domain: Domain::Diabetes,
    positive_label: "Yes",
    negative_label: "No",
    positive_risk: "High Diabetes Risk",
    negative_risk: "Low Diabetes Risk",
    wording: DIABETES_WORDING,
    fallback_explanation: "No report generated.",
};

pub static HEART_PROFILE: DomainProfile = DomainProfile {
    domain: Domain::Heart,
    positive_label: "Heart Disease",
    negative_label: "No Heart Disease",
    positive_risk: "High Heart Disease Risk",
    negative_risk: "Low Heart Disease Risk",
    wording: HEART_WORDING,
    fallback_explanation: "No report generated for this prediction.",
};

pub fn profile_for(domain: Domain) -> &'static DomainProfile {
    match domain {
        Domain::Diabetes => &DIABETES_PROFILE,
        Domain::Heart => &HEART_PROFILE,
    }
}

/// One domain's request pipeline over shared, read-only artifacts.
pub struct RiskPipeline {
    profile: &'static DomainProfile,
    artifacts: Arc<ArtifactBundle>,
    narrator: Arc<dyn Narrator>,
    top_n: usize,
}

impl RiskPipeline {
    pub fn new(artifacts: Arc<ArtifactBundle>, narrator: Arc<dyn Narrator>) -> Self {
        Self {
            profile: profile_for(artifacts.domain()),
            artifacts,
            narrator,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn domain(&self) -> Domain {
        self.profile.domain
    }

    pub fn artifacts(&self) -> &ArtifactBundle {
        &self.artifacts
    }

    /// Run the full pipeline for a validated raw record.
    ///
    /// # Errors
    /// Domain mismatch, encoding failure, or predictor failure. Explanation
    /// failures never surface here.
    pub fn predict<I: RawInput>(&self, raw: &I) -> Result<PredictionResult, PipelineError> {
        if I::DOMAIN != self.domain() {
            return Err(PipelineError::DomainMismatch {
                expected: self.domain().as_str(),
                found: I::DOMAIN.as_str(),
            });
        }
        let features = raw.encode(&self.artifacts.rescaler)?;
        tracing::debug!(
            domain = self.domain().as_str(),
            features = ?features.as_slice(),
            "Encoded feature vector"
        );
        self.predict_vector(&features)
    }

    /// Run prediction and explanation on an already-encoded vector.
    ///
    /// # Errors
    /// Predictor failure or an out-of-range prediction.
    pub fn predict_vector(&self, features: &FeatureVector) -> Result<PredictionResult, PipelineError> {
        let prediction = self.artifacts.predictor.predict(features)?;
        check_prediction(&prediction)?;

        let positive = prediction.class == 1;
        let (label, risk) = if positive {
            (self.profile.positive_label, self.profile.positive_risk)
        } else {
            (self.profile.negative_label, self.profile.negative_risk)
        };

        // Attribution is the expensive step and only explains positives.
        let top_contributors = if positive {
            self.explain(features)
        } else {
            Vec::new()
        };

        let explanation = if top_contributors.is_empty() {
            self.profile.fallback_explanation.to_string()
        } else {
            self.narrate(&top_contributors, prediction.probability, label)
        };

        tracing::info!(
            domain = self.domain().as_str(),
            prediction = prediction.class,
            probability = prediction.probability,
            contributors = top_contributors.len(),
            "Prediction complete"
        );

        Ok(PredictionResult {
            prediction: prediction.class,
            probability: round_probability(prediction.probability),
            label,
            risk,
            top_contributors,
            explanation,
        })
    }

    /// Ranked contributors, or an empty list if attribution fails.
    fn explain(&self, features: &FeatureVector) -> Vec<RankedContributor> {
        let scores = match self.artifacts.oracle.contributions(features) {
            Ok(scores) => scores,
            Err(e) => {
                tracing::warn!(
                    domain = self.domain().as_str(),
                    error = %e,
                    "Attribution failed"
                );
                return Vec::new();
            }
        };

        match attribution::rank(
            &scores,
            features,
            &self.artifacts.feature_names,
            self.top_n,
            self.profile.wording,
        ) {
            Ok(ranked) => ranked,
            Err(e) => {
                tracing::warn!(
                    domain = self.domain().as_str(),
                    error = %e,
                    "Attribution ranking failed"
                );
                Vec::new()
            }
        }
    }

    /// Narrative text, or the fallback if the narrator fails.
    fn narrate(&self, contributors: &[RankedContributor], probability: f64, label: &str) -> String {
        let request = NarrativeRequest {
            domain: self.domain(),
            contributors,
            probability,
            label,
        };
        match self.narrator.narrate(&request) {
            Ok(text) => text,
            Err(e) => {
                if self.narrator.is_enabled() {
                    tracing::warn!(
                        domain = self.domain().as_str(),
                        error = %e,
                        "Narrative generation failed"
                    );
                } else {
                    tracing::debug!(domain = self.domain().as_str(), "Narrator disabled");
                }
                self.profile.fallback_explanation.to_string()
            }
        }
    }
}

fn check_prediction(prediction: &Prediction) -> Result<(), PipelineError> {
    if prediction.class > 1 {
        return Err(PipelineError::InvalidPrediction(format!(
            "class {}",
            prediction.class
        )));
    }
    if !(0.0..=1.0).contains(&prediction.probability) {
        return Err(PipelineError::InvalidPrediction(format!(
            "probability {}",
            prediction.probability
        )));
    }
    Ok(())
}
