use super::{finish, flag, EncodingError, FeatureVector, Rescaler, HEART_SCHEMA};
use crate::models::{ChestPainType, ExerciseAngina, HeartRawInput, HeartSex, StSlope};

/// One-hot order of the chest-pain block.
pub const CHEST_PAIN_ORDER: [ChestPainType; 4] = [
    ChestPainType::Asy,
    ChestPainType::Ata,
    ChestPainType::Nap,
    ChestPainType::Ta,
];

/// Category used for any chest-pain value outside the closed set,
/// including the literal "None" some clients send.
pub const FALLBACK_CHEST_PAIN_TYPE: ChestPainType = ChestPainType::Nap;

/// One-hot order of the ST-slope block.
pub const ST_SLOPE_ORDER: [StSlope; 3] = [StSlope::Down, StSlope::Flat, StSlope::Up];

/// Total mapping from the raw string to a chest-pain category.
pub fn resolve_chest_pain(raw: &str) -> ChestPainType {
    match raw.parse::<ChestPainType>() {
        Ok(cp) => cp,
        Err(_) => {
            tracing::debug!(
                value = raw,
                fallback = FALLBACK_CHEST_PAIN_TYPE.as_str(),
                "Unseen chest pain type"
            );
            FALLBACK_CHEST_PAIN_TYPE
        }
    }
}

fn one_hot<T: PartialEq + Copy, const N: usize>(value: T, order: [T; N]) -> [f64; N] {
    order.map(|v| flag(v == value))
}

/// Encode an examination into the 17-position heart vector.
pub fn encode(raw: &HeartRawInput, rescaler: &Rescaler) -> Result<FeatureVector, EncodingError> {
    let scaled = rescaler.transform(&[
        raw.age as f64,
        raw.resting_bp as f64,
        raw.cholesterol as f64,
        raw.max_hr as f64,
        raw.oldpeak,
    ])?;

    let mut values = Vec::with_capacity(HEART_SCHEMA.len());
    values.extend(one_hot(raw.sex, [HeartSex::Female, HeartSex::Male]));
    values.extend(one_hot(resolve_chest_pain(&raw.chest_pain_type), CHEST_PAIN_ORDER));
    values.extend(one_hot(
        raw.exercise_angina,
        [ExerciseAngina::No, ExerciseAngina::Yes],
    ));
    values.extend(one_hot(raw.st_slope, ST_SLOPE_ORDER));
    values.push(raw.fasting_bs as f64);
    values.extend(scaled);

    finish(&HEART_SCHEMA, values)
}
