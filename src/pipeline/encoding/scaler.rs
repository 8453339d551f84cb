//! Fitted numeric rescalers.

use serde::Deserialize;

use super::EncodingError;

/// Column-wise transform learned at training time.
///
/// Both variants compute `(x - offset) / scale`; they only differ in what
/// the offset means.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rescaler {
    /// Standardization: `offset = mean`, `scale = standard deviation`.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Min-max normalization: `offset = min`, `scale = max - min`.
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Rescaler {
    fn parts(&self) -> (&[f64], &[f64]) {
        match self {
            Self::Standard { mean, scale } => (mean, scale),
            Self::MinMax { min, scale } => (min, scale),
        }
    }

    /// Number of input columns the rescaler was fitted on.
    pub fn width(&self) -> usize {
        self.parts().0.len()
    }

    /// Check that the fitted parameters are usable.
    ///
    /// # Errors
    /// Fails on mismatched parameter lengths, non-finite values or a zero scale.
    pub fn validate(&self) -> Result<(), EncodingError> {
        let (offset, scale) = self.parts();
        if offset.len() != scale.len() {
            return Err(EncodingError::InvalidRescaler(format!(
                "{} offsets but {} scales",
                offset.len(),
                scale.len()
            )));
        }
        if let Some(i) = offset.iter().position(|v| !v.is_finite()) {
            return Err(EncodingError::InvalidRescaler(format!(
                "offset at column {i} is not finite"
            )));
        }
        if let Some(i) = scale.iter().position(|v| !v.is_finite() || *v == 0.0) {
            return Err(EncodingError::InvalidRescaler(format!(
                "scale at column {i} must be finite and non-zero"
            )));
        }
        Ok(())
    }

    /// Rescale one row jointly.
    ///
    /// # Errors
    /// Fails if `row` does not have exactly `width()` columns.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, EncodingError> {
        let (offset, scale) = self.parts();
        if row.len() != offset.len() {
            return Err(EncodingError::RescalerWidth {
                expected: offset.len(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(offset.iter().zip(scale))
            .map(|(x, (o, s))| (x - o) / s)
            .collect())
    }
}
