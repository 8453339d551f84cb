//! Versioned feature-vector contracts.
//!
//! The position of every feature is fixed by the trained model. Changing an
//! entry here without retraining silently misaligns predictions, so artifact
//! loading checks the model's feature count against these tables.

use crate::models::Domain;

/// Bump when any table below changes order or length.
pub const SCHEMA_VERSION: u32 = 1;

/// How a position of the feature vector is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// 0/1 cast of a boolean or a derived threshold.
    Binary,
    /// Integer scale passed through unchanged.
    Ordinal,
    /// Bucket index derived from a continuous value.
    Bucket,
    /// Output of the fitted rescaler.
    Scaled,
    /// One position of a mutually exclusive block.
    OneHot(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureField {
    pub position: usize,
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn field(position: usize, name: &'static str, kind: FeatureKind) -> FeatureField {
    FeatureField {
        position,
        name,
        kind,
    }
}

/// Ordered description of one domain's model input.
#[derive(Debug)]
pub struct FeatureSchema {
    pub version: u32,
    pub domain: Domain,
    pub fields: &'static [FeatureField],
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Positions filled by the rescaler, in rescaler column order.
    pub fn scaled_positions(&self) -> Vec<usize> {
        self.fields
            .iter()
            .filter(|f| f.kind == FeatureKind::Scaled)
            .map(|f| f.position)
            .collect()
    }

    /// Positions belonging to a one-hot group.
    pub fn one_hot_positions(&self, group: &str) -> Vec<usize> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FeatureKind::OneHot(g) if g == group))
            .map(|f| f.position)
            .collect()
    }

    pub fn one_hot_groups(&self) -> Vec<&'static str> {
        let mut groups = Vec::new();
        for f in self.fields {
            if let FeatureKind::OneHot(g) = f.kind {
                if !groups.contains(&g) {
                    groups.push(g);
                }
            }
        }
        groups
    }
}

pub static DIABETES_SCHEMA: FeatureSchema = FeatureSchema {
    version: SCHEMA_VERSION,
    domain: Domain::Diabetes,
    fields: &[
        field(0, "HighBP", FeatureKind::Binary),
        field(1, "HighChol", FeatureKind::Binary),
        field(2, "BMI", FeatureKind::Scaled),
        field(3, "Smoker", FeatureKind::Binary),
        field(4, "PhysActivity", FeatureKind::Binary),
        field(5, "HeartDiseaseorAttack", FeatureKind::Binary),
        field(6, "DiffWalk", FeatureKind::Binary),
        field(7, "Sex", FeatureKind::Binary),
        field(8, "Age", FeatureKind::Scaled),
        field(9, "Stroke", FeatureKind::Binary),
        field(10, "Income", FeatureKind::Bucket),
        field(11, "CholCheck", FeatureKind::Binary),
        field(12, "HvyAlcoholConsump", FeatureKind::Binary),
        field(13, "GenHlth", FeatureKind::Ordinal),
    ],
};

pub static HEART_SCHEMA: FeatureSchema = FeatureSchema {
    version: SCHEMA_VERSION,
    domain: Domain::Heart,
    fields: &[
        field(0, "Sex_F", FeatureKind::OneHot("Sex")),
        field(1, "Sex_M", FeatureKind::OneHot("Sex")),
        field(2, "ChestPainType_ASY", FeatureKind::OneHot("ChestPainType")),
        field(3, "ChestPainType_ATA", FeatureKind::OneHot("ChestPainType")),
        field(4, "ChestPainType_NAP", FeatureKind::OneHot("ChestPainType")),
        field(5, "ChestPainType_TA", FeatureKind::OneHot("ChestPainType")),
        field(6, "ExerciseAngina_N", FeatureKind::OneHot("ExerciseAngina")),
        field(7, "ExerciseAngina_Y", FeatureKind::OneHot("ExerciseAngina")),
        field(8, "ST_Slope_Down", FeatureKind::OneHot("ST_Slope")),
        field(9, "ST_Slope_Flat", FeatureKind::OneHot("ST_Slope")),
        field(10, "ST_Slope_Up", FeatureKind::OneHot("ST_Slope")),
        field(11, "FastingBS", FeatureKind::Binary),
        field(12, "Age", FeatureKind::Scaled),
        field(13, "RestingBP", FeatureKind::Scaled),
        field(14, "Cholesterol", FeatureKind::Scaled),
        field(15, "MaxHR", FeatureKind::Scaled),
        field(16, "Oldpeak", FeatureKind::Scaled),
    ],
};

pub fn schema_for(domain: Domain) -> &'static FeatureSchema {
    match domain {
        Domain::Diabetes => &DIABETES_SCHEMA,
        Domain::Heart => &HEART_SCHEMA,
    }
}

/// Model-ready input: one value per schema position.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<f64> {
        self.0.get(position).copied()
    }
}
