//! Mock implementations of the scoring seam

pub mod classifier;

pub use classifier::{FailingClassifier, StubClassifier};
