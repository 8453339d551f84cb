//! Classifier and attribution oracles.
//!
//! The pipeline only depends on the two traits. `LogisticModel` is the
//! artifact-backed implementation; `MockModel` returns canned outputs.

use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::encoding::FeatureVector;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model expects {expected} features, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    #[error("Invalid model parameters: {0}")]
    InvalidParameters(String),

    #[error("Attribution unavailable: {0}")]
    Attribution(String),
}

/// Output of the classifier for one vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// 0 or 1.
    pub class: u8,
    /// Probability of class 1.
    pub probability: f64,
}

/// Opaque classifier.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError>;

    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;
}

/// Opaque per-feature attribution source.
///
/// Returns one signed score per vector position, in vector order.
pub trait ContributionOracle: Send + Sync {
    fn contributions(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}

/// Logistic regression with exact additive attributions.
///
/// Contribution of feature `i` is `w_i * (x_i - background_i)`; the scores
/// sum to the logit difference between `x` and the background point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Reference point for attributions, usually the training mean.
    pub background: Vec<f64>,
}

fn default_threshold() -> f64 {
    0.5
}

impl LogisticModel {
    /// # Errors
    /// Fails on empty or mismatched parameter vectors, non-finite values, or
    /// a threshold outside (0, 1).
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.is_empty() {
            return Err(ModelError::InvalidParameters("no coefficients".into()));
        }
        if self.background.len() != self.coefficients.len() {
            return Err(ModelError::InvalidParameters(format!(
                "{} coefficients but {} background values",
                self.coefficients.len(),
                self.background.len()
            )));
        }
        let finite = self
            .coefficients
            .iter()
            .chain(&self.background)
            .chain(std::iter::once(&self.intercept))
            .all(|v| v.is_finite());
        if !finite {
            return Err(ModelError::InvalidParameters(
                "non-finite coefficient, intercept or background value".into(),
            ));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ModelError::InvalidParameters(format!(
                "threshold {} outside (0, 1)",
                self.threshold
            )));
        }
        Ok(())
    }

    fn check_width(&self, features: &FeatureVector) -> Result<(), ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::InputWidth {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        Ok(())
    }

    fn logit(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.as_slice())
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Predictor for LogisticModel {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        self.check_width(features)?;
        let probability = sigmoid(self.logit(features));
        let class = u8::from(probability >= self.threshold);
        Ok(Prediction { class, probability })
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

impl ContributionOracle for LogisticModel {
    fn contributions(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        self.check_width(features)?;
        Ok(self
            .coefficients
            .iter()
            .zip(features.as_slice().iter().zip(&self.background))
            .map(|(w, (x, b))| w * (x - b))
            .collect())
    }
}

/// Mock model for testing: fixed prediction and fixed (or failing) attributions.
pub struct MockModel {
    prediction: Prediction,
    contributions: Option<Vec<f64>>,
    n_features: usize,
}

impl MockModel {
    pub fn new(class: u8, probability: f64, n_features: usize) -> Self {
        Self {
            prediction: Prediction { class, probability },
            contributions: Some(vec![0.0; n_features]),
            n_features,
        }
    }

    pub fn with_contributions(mut self, scores: Vec<f64>) -> Self {
        self.contributions = Some(scores);
        self
    }

    /// Make every attribution call fail.
    pub fn with_failing_attribution(mut self) -> Self {
        self.contributions = None;
        self
    }
}

impl Predictor for MockModel {
    fn predict(&self, _features: &FeatureVector) -> Result<Prediction, ModelError> {
        Ok(self.prediction)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

impl ContributionOracle for MockModel {
    fn contributions(&self, _features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        self.contributions
            .clone()
            .ok_or_else(|| ModelError::Attribution("mock attribution failure".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LogisticModel {
        LogisticModel {
            coefficients: vec![2.0, -1.0, 0.5],
            intercept: -0.5,
            threshold: 0.5,
            background: vec![0.5, 0.0, 1.0],
        }
    }

    #[test]
    fn predicts_positive_above_threshold() {
        let p = model()
            .predict(&FeatureVector::new(vec![1.0, 0.0, 1.0]))
            .unwrap();
        // logit = -0.5 + 2.0 + 0.5 = 2.0
        assert!((p.probability - sigmoid(2.0)).abs() < 1e-12);
        assert_eq!(p.class, 1);
    }

    #[test]
    fn predicts_negative_below_threshold() {
        let p = model()
            .predict(&FeatureVector::new(vec![0.0, 2.0, 0.0]))
            .unwrap();
        assert!(p.probability < 0.5);
        assert_eq!(p.class, 0);
    }

    #[test]
    fn contributions_sum_to_logit_difference() {
        let m = model();
        let x = FeatureVector::new(vec![1.0, 3.0, -2.0]);
        let background = FeatureVector::new(m.background.clone());
        let scores = m.contributions(&x).unwrap();
        let total: f64 = scores.iter().sum();
        assert!((total - (m.logit(&x) - m.logit(&background))).abs() < 1e-12);
        assert_eq!(scores, vec![1.0, -3.0, -1.5]);
    }

    #[test]
    fn width_mismatch_rejected() {
        let err = model()
            .predict(&FeatureVector::new(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, ModelError::InputWidth { expected: 3, actual: 1 }));
        assert!(model().contributions(&FeatureVector::new(vec![])).is_err());
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_catches_bad_parameters() {
        let mut m = model();
        m.background.pop();
        assert!(m.validate().is_err());

        let mut m = model();
        m.intercept = f64::NAN;
        assert!(m.validate().is_err());

        let mut m = model();
        m.threshold = 1.0;
        assert!(m.validate().is_err());

        assert!(model().validate().is_ok());
    }

    #[test]
    fn threshold_defaults_to_half() {
        let json = r#"{"coefficients": [1.0], "intercept": 0.0, "background": [0.0]}"#;
        let m: LogisticModel = serde_json::from_str(json).unwrap();
        assert_eq!(m.threshold, 0.5);
    }

    #[test]
    fn mock_attribution_can_fail() {
        let mock = MockModel::new(1, 0.9, 3).with_failing_attribution();
        assert!(mock.contributions(&FeatureVector::new(vec![0.0; 3])).is_err());
        assert_eq!(mock.predict(&FeatureVector::new(vec![])).unwrap().class, 1);
    }
}
