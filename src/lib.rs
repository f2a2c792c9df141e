//! # churn-serve
//!
//! Scores raw telco customer records for churn risk against a trained classifier.
//!
//! ## Usage
//!
//! ```bash
//! churn-serve serve [--listen 0.0.0.0:8000] [--model churn_model.json] [--features model_features.json]
//! churn-serve score record.json
//! ```
//!
//! ## Modules
//!
//! - `schema` - Raw customer record and its closed categorical vocabularies
//! - `validation` - Field and business-rule validation of untrusted input
//! - `features` - Tenure bucketing, one-hot expansion and training-schema reconciliation
//! - `scoring` - Classifier boundary, bundled model families and the response shape
//! - `artifacts` - Loading and fingerprinting the model and feature schema files
//! - `service` - The per-request pipeline
//! - `server` - HTTP API
//! - `client` - HTTP client for a running server
//! - `config` - Layered service configuration
//! - `error` - Error types and codes
//! - `testing` - Testing utilities and fixtures
pub mod artifacts;
pub mod client;
pub mod config;
pub mod error;
pub mod features;
pub mod schema;
pub mod scoring;
pub mod server;
pub mod service;
pub mod validation;

pub mod testing;
