//! Ranking of per-feature attribution scores.

use thiserror::Error;

use crate::models::{Direction, RankedContributor};
use crate::pipeline::encoding::FeatureVector;

/// Number of contributors returned by default.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AttributionError {
    #[error("Got {scores} attribution scores for {features} features")]
    ScoreCount { scores: usize, features: usize },

    #[error("Got {names} feature names for {features} features")]
    NameCount { names: usize, features: usize },
}

/// Words used for each direction in the response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpactWording {
    pub increased: &'static str,
    pub reduced: &'static str,
}

impl ImpactWording {
    pub fn describe(&self, direction: Direction) -> &'static str {
        match direction {
            Direction::Increased => self.increased,
            Direction::Reduced => self.reduced,
        }
    }
}

pub const DIABETES_WORDING: ImpactWording = ImpactWording {
    increased: "increased risk",
    reduced: "reduced risk",
};

pub const HEART_WORDING: ImpactWording = ImpactWording {
    increased: "increased",
    reduced: "reduced",
};

/// Magnitude used for ordering. NaN sorts as zero.
fn magnitude(score: f64) -> f64 {
    let m = score.abs();
    if m.is_nan() {
        0.0
    } else {
        m
    }
}

/// Pick the `top_n` features with the largest absolute score.
///
/// Ordering is by descending magnitude; equal magnitudes keep ascending
/// position order. Direction comes from the sign of the raw score, with zero
/// counted as reduced.
///
/// # Errors
/// Fails if scores or names do not line up with the vector.
pub fn rank(
    scores: &[f64],
    features: &FeatureVector,
    feature_names: &[String],
    top_n: usize,
    wording: ImpactWording,
) -> Result<Vec<RankedContributor>, AttributionError> {
    if scores.len() != features.len() {
        return Err(AttributionError::ScoreCount {
            scores: scores.len(),
            features: features.len(),
        });
    }
    if feature_names.len() != features.len() {
        return Err(AttributionError::NameCount {
            names: feature_names.len(),
            features: features.len(),
        });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by is stable, so ties stay in index order.
    order.sort_by(|&a, &b| magnitude(scores[b]).total_cmp(&magnitude(scores[a])));

    Ok(order
        .into_iter()
        .take(top_n)
        .map(|i| {
            let direction = Direction::of(scores[i]);
            RankedContributor {
                feature: feature_names[i].clone(),
                value: features.as_slice()[i],
                impact: wording.describe(direction),
                shap: scores[i],
                direction,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    fn vector(n: usize) -> FeatureVector {
        FeatureVector::new((0..n).map(|i| i as f64 * 10.0).collect())
    }

    fn ranked_features(out: &[RankedContributor]) -> Vec<&str> {
        out.iter().map(|c| c.feature.as_str()).collect()
    }

    #[test]
    fn orders_by_absolute_score() {
        let scores = [0.1, -0.9, 0.4, 0.0, -0.2, 0.7];
        let out = rank(&scores, &vector(6), &names(6), 5, HEART_WORDING).unwrap();
        assert_eq!(ranked_features(&out), vec!["f1", "f5", "f2", "f4", "f0"]);
        assert_eq!(out[0].shap, -0.9);
        assert_eq!(out[0].value, 10.0);
        assert_eq!(out[0].impact, "reduced");
        assert_eq!(out[1].impact, "increased");
    }

    #[test]
    fn magnitudes_strictly_non_increasing() {
        let scores = [0.3, -0.5, 0.5, 0.05, -1.2, 0.8, -0.01];
        let out = rank(&scores, &vector(7), &names(7), 7, DIABETES_WORDING).unwrap();
        for pair in out.windows(2) {
            assert!(pair[0].shap.abs() >= pair[1].shap.abs());
        }
    }

    #[test]
    fn ties_keep_index_order() {
        let scores = [0.5, -0.5, 0.2, 0.5, -0.5];
        let out = rank(&scores, &vector(5), &names(5), 5, HEART_WORDING).unwrap();
        assert_eq!(ranked_features(&out), vec!["f0", "f1", "f3", "f4", "f2"]);
    }

    #[test]
    fn length_is_min_of_top_n_and_vector() {
        let scores = [0.1, 0.2, 0.3];
        assert_eq!(rank(&scores, &vector(3), &names(3), 5, HEART_WORDING).unwrap().len(), 3);
        assert_eq!(rank(&scores, &vector(3), &names(3), 2, HEART_WORDING).unwrap().len(), 2);
        assert!(rank(&scores, &vector(3), &names(3), 0, HEART_WORDING).unwrap().is_empty());
    }

    #[test]
    fn zero_score_is_reduced() {
        let scores = [0.0];
        let out = rank(&scores, &vector(1), &names(1), 5, DIABETES_WORDING).unwrap();
        assert_eq!(out[0].direction, Direction::Reduced);
        assert_eq!(out[0].impact, "reduced risk");
    }

    #[test]
    fn nan_ranks_last() {
        let scores = [f64::NAN, 0.1, -0.2];
        let out = rank(&scores, &vector(3), &names(3), 3, HEART_WORDING).unwrap();
        assert_eq!(ranked_features(&out), vec!["f2", "f1", "f0"]);
        assert_eq!(out[2].direction, Direction::Reduced);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        assert_eq!(
            rank(&[0.1, 0.2], &vector(3), &names(3), 5, HEART_WORDING).unwrap_err(),
            AttributionError::ScoreCount {
                scores: 2,
                features: 3
            }
        );
        assert_eq!(
            rank(&[0.1, 0.2, 0.3], &vector(3), &names(2), 5, HEART_WORDING).unwrap_err(),
            AttributionError::NameCount {
                names: 2,
                features: 3
            }
        );
    }

    #[test]
    fn deterministic_across_calls() {
        let scores = [0.2, -0.2, 0.2, 0.9];
        let a = rank(&scores, &vector(4), &names(4), 3, HEART_WORDING).unwrap();
        let b = rank(&scores, &vector(4), &names(4), 3, HEART_WORDING).unwrap();
        assert_eq!(a, b);
    }
}
