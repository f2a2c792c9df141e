//! Classifier doubles

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ChurnError, ErrorCode, Result};
use crate::scoring::Classifier;

/// Returns a fixed label and probability for any correctly sized input
#[derive(Debug, Default)]
pub struct StubClassifier {
    n_features: usize,
    label: u8,
    probability: f64,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new(n_features: usize, label: u8, probability: f64) -> Self {
        Self {
            n_features,
            label,
            probability,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of predict calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for StubClassifier {
    fn kind(&self) -> &'static str {
        "stub"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_label(&self, _features: &[f64]) -> Result<u8> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.label)
    }

    fn predict_probability(&self, _features: &[f64]) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probability)
    }
}

/// Fails every call, as a broken model runtime would
#[derive(Debug, Default)]
pub struct FailingClassifier {
    pub n_features: usize,
}

impl Classifier for FailingClassifier {
    fn kind(&self) -> &'static str {
        "failing"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_label(&self, _features: &[f64]) -> Result<u8> {
        Err(ChurnError::scoring(
            ErrorCode::SCORING_GENERIC,
            "model runtime unavailable",
        ))
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64> {
        self.predict_label(features).map(f64::from)
    }
}
