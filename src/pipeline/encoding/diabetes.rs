use super::{finish, flag, EncodingError, FeatureVector, Rescaler, DIABETES_SCHEMA};
use crate::models::{DiabetesRawInput, Sex};

/// Upper bounds of the income buckets, in dollars per year.
pub const INCOME_THRESHOLDS: [i64; 7] = [10_000, 20_000, 30_000, 40_000, 50_000, 60_000, 70_000];

/// Systolic pressure at or above which blood pressure counts as high.
pub const HIGH_SYSTOLIC_MMHG: i64 = 140;
/// Diastolic pressure at or above which blood pressure counts as high.
pub const HIGH_DIASTOLIC_MMHG: i64 = 90;
/// Total cholesterol strictly above which cholesterol counts as high.
pub const HIGH_CHOLESTEROL_MG_DL: i64 = 200;

/// Income bucket 1..=8: one plus the number of thresholds strictly exceeded.
pub fn income_bucket(annual_income: i64) -> u8 {
    let exceeded = INCOME_THRESHOLDS
        .iter()
        .filter(|&&t| annual_income > t)
        .count();
    exceeded as u8 + 1
}

pub fn high_blood_pressure(systolic: i64, diastolic: i64) -> bool {
    systolic >= HIGH_SYSTOLIC_MMHG || diastolic >= HIGH_DIASTOLIC_MMHG
}

pub fn high_cholesterol(cholesterol_mg_dl: i64) -> bool {
    cholesterol_mg_dl > HIGH_CHOLESTEROL_MG_DL
}

/// Encode a questionnaire into the 14-position diabetes vector.
pub fn encode(raw: &DiabetesRawInput, rescaler: &Rescaler) -> Result<FeatureVector, EncodingError> {
    // BMI and age are rescaled together, in that column order.
    let scaled = rescaler.transform(&[raw.bmi, raw.age_years as f64])?;

    let values = vec![
        flag(high_blood_pressure(raw.systolic_bp, raw.diastolic_bp)),
        flag(high_cholesterol(raw.cholesterol_mg_dl)),
        scaled[0],
        flag(raw.smoker),
        flag(raw.phys_activity),
        flag(raw.heart_disease_or_attack),
        flag(raw.diff_walk),
        flag(raw.sex == Sex::Male),
        scaled[1],
        flag(raw.stroke),
        f64::from(income_bucket(raw.annual_income)),
        flag(raw.chol_check),
        flag(raw.hvy_alcohol_consump),
        raw.gen_health as f64,
    ];

    finish(&DIABETES_SCHEMA, values)
}
