//! Testing utilities and fixtures
//!
//! Payload builders, classifier doubles and on-disk artifact fixtures shared by
//! unit tests, integration tests and benchmarks.

pub mod fixtures;
pub mod mocks;

pub use fixtures::builders::CustomerPayload;
pub use fixtures::{logistic_artifact, write_artifacts, ArtifactFixture};
pub use mocks::{FailingClassifier, StubClassifier};
