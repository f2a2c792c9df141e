//! Scoring: the opaque classifier boundary and the response shape
//!
//! The pipeline only ever sees a [`Classifier`]; concrete model families live in
//! [`logistic`] and [`forest`] and are chosen by the artifact loader.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{ChurnError, ErrorCode, Result};
use crate::features::FeatureVector;

pub mod forest;
pub mod logistic;

pub use forest::{DecisionTree, RandomForest};
pub use logistic::LogisticModel;

/// A trained binary classifier over a fixed-width numeric input.
///
/// Implementations must be deterministic and free of interior mutation; a single
/// instance is shared by every concurrent request.
pub trait Classifier: Send + Sync {
    /// Model family, for logs and metadata.
    fn kind(&self) -> &'static str;

    /// Input width the model was fit against.
    fn n_features(&self) -> usize;

    /// Hard label, `0` (stays) or `1` (churns).
    fn predict_label(&self, features: &[f64]) -> Result<u8>;

    /// Estimated probability of the positive (churn) class.
    fn predict_probability(&self, features: &[f64]) -> Result<f64>;
}

/// Raw classifier output for one vector, already range-checked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub label: u8,
    pub probability: f64,
}

/// Invokes the shared classifier and enforces its output contract
#[derive(Clone)]
pub struct Scorer {
    classifier: Arc<dyn Classifier>,
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorer")
            .field("kind", &self.classifier.kind())
            .field("n_features", &self.classifier.n_features())
            .finish()
    }
}

impl Scorer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn score(&self, vector: &FeatureVector<'_>) -> Result<Score> {
        let expected = self.classifier.n_features();
        if vector.len() != expected {
            return Err(ChurnError::scoring(
                ErrorCode::SCORING_WIDTH_MISMATCH,
                format!(
                    "model expects {} features, vector has {}",
                    expected,
                    vector.len()
                ),
            ));
        }

        let label = self.classifier.predict_label(vector.values())?;
        if label > 1 {
            return Err(ChurnError::scoring(
                ErrorCode::SCORING_INVALID_LABEL,
                format!("classifier returned label {}", label),
            ));
        }

        let probability = self.classifier.predict_probability(vector.values())?;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(ChurnError::scoring(
                ErrorCode::SCORING_INVALID_PROBABILITY,
                format!("classifier returned probability {}", probability),
            ));
        }

        Ok(Score { label, probability })
    }
}

/// `"Yes"` when the customer is predicted to churn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnLabel {
    Yes,
    No,
}

impl ChurnLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body of a successful prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub churn_prediction: u8,
    pub churn_label: ChurnLabel,
    pub churn_probability: f64,
}

impl From<Score> for PredictionResult {
    fn from(score: Score) -> Self {
        Self {
            churn_prediction: score.label,
            churn_label: if score.label == 1 {
                ChurnLabel::Yes
            } else {
                ChurnLabel::No
            },
            churn_probability: round_probability(score.probability),
        }
    }
}

/// Round to 4 decimal places.
///
/// Rounds the exact binary value, so `0.50005` (stored just below the tie)
/// becomes `0.5`. Scaling by 10 000 first would round twice.
pub fn round_probability(probability: f64) -> f64 {
    format!("{:.4}", probability)
        .parse()
        .unwrap_or(probability)
}
