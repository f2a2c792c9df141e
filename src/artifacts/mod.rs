//! Artifact loading: the trained model and its feature schema
//!
//! Both artifacts are read once at startup. Any problem here is fatal for the
//! process; nothing is served from a partially loaded or inconsistent pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ChurnError, ErrorCode, Result};
use crate::features::FeatureSchema;
use crate::scoring::{Classifier, LogisticModel, RandomForest};

pub const API_TITLE: &str = "Telco Customer Churn Prediction API";
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serialized model, tagged by family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Logistic(LogisticModel),
    RandomForest(RandomForest),
}

impl ModelArtifact {
    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Self::Logistic(model) => model.validate(),
            Self::RandomForest(model) => model.validate(),
        }
    }

    fn into_classifier(self) -> Arc<dyn Classifier> {
        match self {
            Self::Logistic(model) => Arc::new(model),
            Self::RandomForest(model) => Arc::new(model),
        }
    }
}

/// Provenance of one loaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: usize,
}

/// The process-wide, read-only inference state
#[derive(Clone)]
pub struct LoadedArtifacts {
    pub classifier: Arc<dyn Classifier>,
    pub schema: Arc<FeatureSchema>,
    pub model_info: ArtifactInfo,
    pub features_info: ArtifactInfo,
    pub loaded_at: DateTime<Utc>,
}

/// Public description of what is being served
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub title: &'static str,
    pub version: &'static str,
    pub model_kind: &'static str,
    pub n_features: usize,
    pub features: Vec<String>,
    pub model_sha256: String,
    pub features_sha256: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedArtifacts {
    pub fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            title: API_TITLE,
            version: API_VERSION,
            model_kind: self.classifier.kind(),
            n_features: self.schema.len(),
            features: self.schema.columns().to_vec(),
            model_sha256: self.model_info.sha256.clone(),
            features_sha256: self.features_info.sha256.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

fn read_artifact(path: &Path) -> Result<(Vec<u8>, ArtifactInfo)> {
    let bytes = std::fs::read(path).map_err(|e| {
        let code = if e.kind() == std::io::ErrorKind::NotFound {
            ErrorCode::ARTIFACT_NOT_FOUND
        } else {
            ErrorCode::ARTIFACT_UNREADABLE
        };
        ChurnError::artifact(code, e.to_string(), Some(path.to_path_buf())).with_source(e)
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let info = ArtifactInfo {
        path: path.to_path_buf(),
        sha256: format!("{:x}", hasher.finalize()),
        bytes: bytes.len(),
    };
    debug!(path = %path.display(), bytes = info.bytes, sha256 = %info.sha256, "Read artifact");
    Ok((bytes, info))
}

fn malformed(path: &Path, err: serde_json::Error) -> ChurnError {
    ChurnError::artifact(
        ErrorCode::ARTIFACT_MALFORMED,
        err.to_string(),
        Some(path.to_path_buf()),
    )
    .with_source(err)
}

/// Parse a feature schema: a JSON array of column names.
pub fn parse_feature_schema(bytes: &[u8], path: &Path) -> Result<FeatureSchema> {
    let columns: Vec<String> = serde_json::from_slice(bytes).map_err(|e| malformed(path, e))?;
    FeatureSchema::new(columns, Some(path.to_path_buf()))
}

/// Parse and structurally validate a model artifact.
pub fn parse_model(bytes: &[u8], path: &Path) -> Result<Arc<dyn Classifier>> {
    let artifact: ModelArtifact = serde_json::from_slice(bytes).map_err(|e| malformed(path, e))?;
    artifact.validate().map_err(|reason| {
        ChurnError::artifact(
            ErrorCode::ARTIFACT_INVALID_MODEL,
            reason,
            Some(path.to_path_buf()),
        )
    })?;
    Ok(artifact.into_classifier())
}

pub fn load_feature_schema(path: &Path) -> Result<(FeatureSchema, ArtifactInfo)> {
    let (bytes, info) = read_artifact(path)?;
    Ok((parse_feature_schema(&bytes, path)?, info))
}

pub fn load_model(path: &Path) -> Result<(Arc<dyn Classifier>, ArtifactInfo)> {
    let (bytes, info) = read_artifact(path)?;
    Ok((parse_model(&bytes, path)?, info))
}

/// Load the model and its schema and check they describe the same input space.
pub fn load_artifacts(model_path: &Path, features_path: &Path) -> Result<LoadedArtifacts> {
    let (schema, features_info) = load_feature_schema(features_path)?;
    let (classifier, model_info) = load_model(model_path)?;

    if classifier.n_features() != schema.len() {
        return Err(ChurnError::artifact(
            ErrorCode::ARTIFACT_WIDTH_MISMATCH,
            format!(
                "model expects {} input features but the schema lists {}",
                classifier.n_features(),
                schema.len()
            ),
            Some(model_path.to_path_buf()),
        ));
    }

    info!(
        model = %model_path.display(),
        kind = classifier.kind(),
        features = schema.len(),
        model_sha256 = %model_info.sha256,
        features_sha256 = %features_info.sha256,
        "Loaded model artifacts"
    );

    Ok(LoadedArtifacts {
        classifier,
        schema: Arc::new(schema),
        model_info,
        features_info,
        loaded_at: Utc::now(),
    })
}
