//! Test fixtures and data builders

pub mod builders;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::artifacts::ModelArtifact;
use crate::features::FeatureSchema;
use crate::scoring::LogisticModel;

/// Coefficients of a plausible churn model, keyed by feature column.
const CHURN_DRIVERS: &[(&str, f64)] = &[
    ("Contract_Month-to-month", 0.8),
    ("Contract_Two year", -1.2),
    ("InternetService_Fiber optic", 0.6),
    ("PaymentMethod_Electronic check", 0.4),
    ("tenure_group_1 - 11", 0.7),
    ("tenure_group_60 - 71", -0.9),
    ("OnlineSecurity_Yes", -0.3),
    ("TechSupport_Yes", -0.3),
    ("MonthlyCharges", 0.01),
    ("TotalCharges", -0.0003),
];

/// A logistic model over `schema` whose weights follow [`CHURN_DRIVERS`].
///
/// Columns not listed get weight 0.
pub fn logistic_artifact(schema: &FeatureSchema) -> ModelArtifact {
    let coefficients = schema
        .columns()
        .iter()
        .map(|column| {
            CHURN_DRIVERS
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, weight)| *weight)
                .unwrap_or(0.0)
        })
        .collect();
    ModelArtifact::Logistic(LogisticModel {
        intercept: -1.0,
        coefficients,
        threshold: 0.5,
    })
}

/// Write a model and schema into `dir`, returning `(model_path, features_path)`.
pub fn write_artifacts(
    dir: &Path,
    model: &ModelArtifact,
    schema: &FeatureSchema,
) -> Result<(PathBuf, PathBuf)> {
    let model_path = dir.join("churn_model.json");
    let features_path = dir.join("model_features.json");
    std::fs::write(&model_path, serde_json::to_vec_pretty(model)?)?;
    std::fs::write(&features_path, serde_json::to_vec_pretty(schema.columns())?)?;
    Ok((model_path, features_path))
}

/// Artifacts written to a temporary directory that lives as long as the fixture
pub struct ArtifactFixture {
    pub temp_dir: TempDir,
    pub model_path: PathBuf,
    pub features_path: PathBuf,
}

impl ArtifactFixture {
    /// Logistic model over the full one-hot reference schema
    pub fn new() -> Result<Self> {
        let schema = FeatureSchema::one_hot_reference();
        Self::with_model(&logistic_artifact(&schema), &schema)
    }

    pub fn with_model(model: &ModelArtifact, schema: &FeatureSchema) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let (model_path, features_path) = write_artifacts(temp_dir.path(), model, schema)?;
        Ok(Self {
            temp_dir,
            model_path,
            features_path,
        })
    }
}
