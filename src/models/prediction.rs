//! Prediction response types.

use serde::Serialize;

/// Sign of a feature's contribution toward the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Strictly positive score.
    Increased,
    /// Zero or negative score.
    Reduced,
}

impl Direction {
    /// Classify a signed attribution score. Zero is not an increase.
    pub fn of(score: f64) -> Self {
        if score > 0.0 {
            Self::Increased
        } else {
            Self::Reduced
        }
    }
}

/// One of the top features behind a positive prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedContributor {
    pub feature: String,
    /// Value at this position of the encoded vector (post-scaling).
    pub value: f64,
    /// Domain wording for `direction`.
    pub impact: &'static str,
    /// Raw signed attribution score.
    pub shap: f64,
    #[serde(skip)]
    pub direction: Direction,
}

/// Response payload of a prediction endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub prediction: u8,
    /// Positive-class probability rounded to 4 decimal places.
    pub probability: f64,
    pub label: &'static str,
    pub risk: &'static str,
    pub top_contributors: Vec<RankedContributor>,
    pub explanation: String,
}

/// Round a probability to 4 decimal places for the response payload.
pub fn round_probability(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 10_000.0
}
