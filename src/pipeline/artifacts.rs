//! Immutable per-domain model artifacts.
//!
//! Each domain ships one JSON file holding the feature names, the fitted
//! rescaler and the classifier. The bundle is loaded once at startup, checked
//! against the compiled feature schema, and shared read-only afterwards.
//! Any inconsistency is fatal: there is no degraded mode without a model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::models::Domain;
use crate::pipeline::encoding::{schema_for, FeatureSchema, Rescaler};
use crate::pipeline::model::{ContributionOracle, LogisticModel, Predictor};

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Cannot read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact is for {found}, expected {expected}")]
    DomainMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Artifact schema version {found} does not match compiled version {expected}")]
    SchemaVersion { expected: u32, found: u32 },

    #[error("{what} has {found} entries, the {domain} schema has {expected}")]
    FeatureCount {
        domain: &'static str,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid artifact: {0}")]
    Invalid(String),
}

/// Classifier section of an artifact file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Logistic(LogisticModel),
}

/// On-disk layout of an artifact file.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactFile {
    pub schema_version: u32,
    pub domain: Domain,
    pub feature_names: Vec<String>,
    pub scaler: Rescaler,
    pub model: ModelSpec,
}

/// Everything a pipeline needs from training, checked and read-only.
pub struct ArtifactBundle {
    pub schema: &'static FeatureSchema,
    pub feature_names: Vec<String>,
    pub rescaler: Rescaler,
    pub predictor: Arc<dyn Predictor>,
    pub oracle: Arc<dyn ContributionOracle>,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("domain", &self.schema.domain)
            .field("feature_names", &self.feature_names)
            .field("rescaler", &self.rescaler)
            .finish_non_exhaustive()
    }
}

impl ArtifactBundle {
    /// Assemble and check a bundle from already-loaded parts.
    ///
    /// # Errors
    /// Fails if the feature names, rescaler width or predictor width
    /// disagree with the domain's schema.
    pub fn new(
        domain: Domain,
        feature_names: Vec<String>,
        rescaler: Rescaler,
        predictor: Arc<dyn Predictor>,
        oracle: Arc<dyn ContributionOracle>,
    ) -> Result<Self, ArtifactError> {
        let schema = schema_for(domain);
        let count = |what, found| ArtifactError::FeatureCount {
            domain: domain.as_str(),
            what,
            expected: schema.len(),
            found,
        };

        if feature_names.len() != schema.len() {
            return Err(count("feature_names", feature_names.len()));
        }
        if predictor.n_features() != schema.len() {
            return Err(count("model", predictor.n_features()));
        }

        rescaler
            .validate()
            .map_err(|e| ArtifactError::Invalid(e.to_string()))?;
        let scaled = schema.scaled_positions().len();
        if rescaler.width() != scaled {
            return Err(ArtifactError::Invalid(format!(
                "rescaler has {} columns, the {} schema rescales {}",
                rescaler.width(),
                domain.as_str(),
                scaled
            )));
        }

        for (position, (given, expected)) in feature_names.iter().zip(schema.names()).enumerate() {
            if given != expected {
                tracing::warn!(
                    domain = domain.as_str(),
                    position,
                    artifact_name = %given,
                    schema_name = expected,
                    "Artifact feature name differs from schema"
                );
            }
        }

        Ok(Self {
            schema,
            feature_names,
            rescaler,
            predictor,
            oracle,
        })
    }

    /// Build a bundle from a parsed artifact file.
    ///
    /// # Errors
    /// Fails on domain or schema-version mismatch and on any check of `new`.
    pub fn from_file(expected: Domain, file: ArtifactFile) -> Result<Self, ArtifactError> {
        if file.domain != expected {
            return Err(ArtifactError::DomainMismatch {
                expected: expected.as_str(),
                found: file.domain.as_str(),
            });
        }
        let schema = schema_for(expected);
        if file.schema_version != schema.version {
            return Err(ArtifactError::SchemaVersion {
                expected: schema.version,
                found: file.schema_version,
            });
        }

        let (predictor, oracle): (Arc<dyn Predictor>, Arc<dyn ContributionOracle>) =
            match file.model {
                ModelSpec::Logistic(model) => {
                    model
                        .validate()
                        .map_err(|e| ArtifactError::Invalid(e.to_string()))?;
                    let model = Arc::new(model);
                    let predictor: Arc<dyn Predictor> = model.clone();
                    let oracle: Arc<dyn ContributionOracle> = model;
                    (predictor, oracle)
                }
            };

        Self::new(expected, file.feature_names, file.scaler, predictor, oracle)
    }

    /// Read and check `path`.
    ///
    /// # Errors
    /// Any I/O, parse or consistency failure, with the path in the message.
    pub fn load(expected: Domain, path: &Path) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ArtifactFile = serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_file(expected, file)?;

        tracing::info!(
            domain = expected.as_str(),
            path = %path.display(),
            features = bundle.feature_names.len(),
            "Model artifacts loaded"
        );
        Ok(bundle)
    }

    pub fn domain(&self) -> Domain {
        self.schema.domain
    }
}

/// File name of a domain's artifact inside the models directory.
pub fn artifact_file_name(domain: Domain) -> String {
    format!("{}.json", domain.as_str())
}

/// Load a domain's artifacts from the models directory.
///
/// # Errors
/// See [`ArtifactBundle::load`].
pub fn load_domain(models_dir: &Path, domain: Domain) -> Result<ArtifactBundle, ArtifactError> {
    ArtifactBundle::load(domain, &models_dir.join(artifact_file_name(domain)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pipeline::model::MockModel;

    pub(crate) const DIABETES_ARTIFACT: &str = include_str!("../../models/diabetes.json");
    pub(crate) const HEART_ARTIFACT: &str = include_str!("../../models/heart.json");

    pub(crate) fn shipped_bundle(domain: Domain) -> ArtifactBundle {
        let raw = match domain {
            Domain::Diabetes => DIABETES_ARTIFACT,
            Domain::Heart => HEART_ARTIFACT,
        };
        let file: ArtifactFile = serde_json::from_str(raw).unwrap();
        ArtifactBundle::from_file(domain, file).unwrap()
    }

    /// Bundle around a mock model, with schema names and an identity-like scaler.
    pub(crate) fn mock_bundle(domain: Domain, model: MockModel) -> ArtifactBundle {
        let schema = schema_for(domain);
        let width = schema.scaled_positions().len();
        let model = Arc::new(model);
        ArtifactBundle::new(
            domain,
            schema.names().map(String::from).collect(),
            Rescaler::Standard {
                mean: vec![0.0; width],
                scale: vec![1.0; width],
            },
            model.clone(),
            model,
        )
        .unwrap()
    }

    fn parsed(raw: &str) -> serde_json::Value {
        serde_json::from_str(raw).unwrap()
    }

    fn from_value(domain: Domain, value: serde_json::Value) -> Result<ArtifactBundle, ArtifactError> {
        ArtifactBundle::from_file(domain, serde_json::from_value(value).unwrap())
    }

    #[test]
    fn shipped_artifacts_match_schema() {
        for domain in [Domain::Diabetes, Domain::Heart] {
            let bundle = shipped_bundle(domain);
            let expected: Vec<&str> = schema_for(domain).names().collect();
            assert_eq!(bundle.feature_names, expected);
            assert_eq!(bundle.domain(), domain);
        }
    }

    #[test]
    fn domain_mismatch_rejected() {
        let err = from_value(Domain::Heart, parsed(DIABETES_ARTIFACT)).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::DomainMismatch {
                expected: "heart",
                found: "diabetes"
            }
        ));
    }

    #[test]
    fn schema_version_mismatch_rejected() {
        let mut value = parsed(HEART_ARTIFACT);
        value["schema_version"] = serde_json::json!(99);
        let err = from_value(Domain::Heart, value).unwrap_err();
        assert!(matches!(err, ArtifactError::SchemaVersion { found: 99, .. }));
    }

    #[test]
    fn short_feature_list_rejected() {
        let mut value = parsed(DIABETES_ARTIFACT);
        value["feature_names"].as_array_mut().unwrap().pop();
        let err = from_value(Domain::Diabetes, value).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::FeatureCount {
                what: "feature_names",
                expected: 14,
                found: 13,
                ..
            }
        ));
    }

    #[test]
    fn model_width_mismatch_rejected() {
        let model = Arc::new(MockModel::new(0, 0.1, 5));
        let err = ArtifactBundle::new(
            Domain::Heart,
            schema_for(Domain::Heart).names().map(String::from).collect(),
            Rescaler::Standard {
                mean: vec![0.0; 5],
                scale: vec![1.0; 5],
            },
            model.clone(),
            model,
        )
        .unwrap_err();
        assert!(matches!(err, ArtifactError::FeatureCount { what: "model", .. }));
    }

    #[test]
    fn rescaler_width_mismatch_rejected() {
        let mut value = parsed(DIABETES_ARTIFACT);
        value["scaler"] = serde_json::json!({"kind": "standard", "mean": [0.0], "scale": [1.0]});
        let err = from_value(Domain::Diabetes, value).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid(_)));
    }

    #[test]
    fn zero_scale_rejected() {
        let mut value = parsed(DIABETES_ARTIFACT);
        value["scaler"]["scale"][0] = serde_json::json!(0.0);
        assert!(from_value(Domain::Diabetes, value).is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("heart.json"), HEART_ARTIFACT).unwrap();
        let bundle = load_domain(dir.path(), Domain::Heart).unwrap();
        assert_eq!(bundle.feature_names.len(), 17);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_domain(dir.path(), Domain::Diabetes).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("diabetes.json"));
    }

    #[test]
    fn malformed_json_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("diabetes.json"), "{not json").unwrap();
        let err = load_domain(dir.path(), Domain::Diabetes).unwrap_err();
        assert!(matches!(err, ArtifactError::Json { .. }));
        assert!(err.to_string().contains("diabetes.json"));
    }

    #[test]
    fn artifact_file_names() {
        assert_eq!(artifact_file_name(Domain::Diabetes), "diabetes.json");
        assert_eq!(artifact_file_name(Domain::Heart), "heart.json");
    }
}
