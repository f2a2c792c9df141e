//! Logistic regression over the feature vector

use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, ErrorCode, Result};

use super::Classifier;

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    /// Structural checks applied when the artifact is loaded.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("logistic model has no coefficients".to_string());
        }
        if !self.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }
        if let Some(i) = self.coefficients.iter().position(|w| !w.is_finite()) {
            return Err(format!("coefficient {} is not finite", i));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(format!(
                "decision threshold {} must lie strictly between 0 and 1",
                self.threshold
            ));
        }
        Ok(())
    }

    fn check_width(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.coefficients.len() {
            return Err(ChurnError::scoring(
                ErrorCode::SCORING_WIDTH_MISMATCH,
                format!(
                    "logistic model expects {} features, got {}",
                    self.coefficients.len(),
                    features.len()
                ),
            ));
        }
        Ok(())
    }

    fn decision(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_label(&self, features: &[f64]) -> Result<u8> {
        let probability = self.predict_probability(features)?;
        Ok(u8::from(probability > self.threshold))
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64> {
        self.check_width(features)?;
        Ok(sigmoid(self.decision(features)))
    }
}
