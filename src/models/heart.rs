//! Raw heart-disease examination input.

use serde::{Deserialize, Serialize};

use super::enums::{ExerciseAngina, HeartSex, StSlope};

/// Examination values for the heart-disease risk model.
///
/// `ChestPainType` stays a free string: values outside the closed set are
/// resolved by the encoder's fallback instead of being rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRawInput {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Sex")]
    pub sex: HeartSex,
    #[serde(rename = "ChestPainType")]
    pub chest_pain_type: String,
    #[serde(rename = "RestingBP")]
    pub resting_bp: i64,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: i64,
    /// Fasting blood sugar > 120 mg/dl, already 0/1.
    #[serde(rename = "FastingBS")]
    pub fasting_bs: i64,
    #[serde(rename = "MaxHR")]
    pub max_hr: i64,
    #[serde(rename = "ExerciseAngina")]
    pub exercise_angina: ExerciseAngina,
    #[serde(rename = "Oldpeak")]
    pub oldpeak: f64,
    #[serde(rename = "ST_Slope", alias = "stSlope")]
    pub st_slope: StSlope,
}

impl HeartRawInput {
    /// Validate that every numeric field is within its declared domain.
    ///
    /// # Errors
    /// Returns every violation found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(1..=120).contains(&self.age) {
            errors.push(format!("Age {} out of range [1, 120]", self.age));
        }
        if self.fasting_bs != 0 && self.fasting_bs != 1 {
            errors.push(format!("FastingBS {} must be 0 or 1", self.fasting_bs));
        }
        for (field, value) in [
            ("RestingBP", self.resting_bp),
            ("Cholesterol", self.cholesterol),
            ("MaxHR", self.max_hr),
        ] {
            if value < 0 {
                errors.push(format!("{field} {value} must be non-negative"));
            }
        }
        if !self.oldpeak.is_finite() {
            errors.push(format!("Oldpeak {} must be a finite number", self.oldpeak));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
