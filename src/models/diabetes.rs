//! Raw diabetes questionnaire input.

use serde::{Deserialize, Serialize};

use super::enums::Sex;

/// Clinical and lifestyle answers for the diabetes risk model.
///
/// Field names are the wire contract of `POST /api/predict-diabetes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesRawInput {
    pub systolic_bp: i64,
    pub diastolic_bp: i64,
    pub cholesterol_mg_dl: i64,
    pub bmi: f64,
    pub smoker: bool,
    pub phys_activity: bool,
    pub heart_disease_or_attack: bool,
    pub diff_walk: bool,
    pub sex: Sex,
    pub age_years: i64,
    pub stroke: bool,
    pub annual_income: i64,
    pub chol_check: bool,
    pub hvy_alcohol_consump: bool,
    /// Self-rated general health, 1 (excellent) to 5 (poor).
    pub gen_health: i64,
}

impl DiabetesRawInput {
    /// Validate that every field is within its declared domain.
    ///
    /// # Errors
    /// Returns every violation found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_range(&mut errors, "systolic_bp", self.systolic_bp, 80, 250);
        check_range(&mut errors, "diastolic_bp", self.diastolic_bp, 50, 150);
        check_range(&mut errors, "cholesterol_mg_dl", self.cholesterol_mg_dl, 100, 400);
        if !self.bmi.is_finite() || !(10.0..=60.0).contains(&self.bmi) {
            errors.push(format!("bmi {} out of range [10, 60]", self.bmi));
        }
        check_range(&mut errors, "age_years", self.age_years, 1, 120);
        if self.annual_income < 0 {
            errors.push(format!(
                "annual_income {} must be non-negative",
                self.annual_income
            ));
        }
        check_range(&mut errors, "gen_health", self.gen_health, 1, 5);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_range(errors: &mut Vec<String>, field: &str, value: i64, low: i64, high: i64) {
    if !(low..=high).contains(&value) {
        errors.push(format!("{field} {value} out of range [{low}, {high}]"));
    }
}
