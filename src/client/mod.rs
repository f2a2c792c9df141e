//! HTTP client for a running prediction server
//!
//! Mirrors what an interactive front end needs: a scored result, the list of
//! rejected fields, a server failure, or no server at all.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{ChurnError, ErrorCode, Result};
use crate::scoring::{ChurnLabel, PredictionResult};
use crate::validation::ValidationIssue;

pub const DEFAULT_URL: &str = "http://localhost:8000";

/// What the server made of one record
#[derive(Debug, Clone, PartialEq)]
pub enum PredictOutcome {
    Scored(PredictionResult),
    Rejected(Vec<ValidationIssue>),
    ServerError { status: u16, body: String },
}

#[derive(Deserialize)]
struct RejectionBody {
    detail: Vec<ValidationIssue>,
}

pub struct ChurnClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChurnClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ChurnError::client(ErrorCode::CLIENT_GENERIC, "failed to build HTTP client")
                    .with_source(e)
            })?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `record` to `/predict`.
    pub async fn predict(&self, record: &Value) -> Result<PredictOutcome> {
        let url = format!("{}/predict", self.base_url);
        debug!(url = %url, "Requesting prediction");

        let response = self
            .http
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        match status {
            StatusCode::OK => serde_json::from_str(&body)
                .map(PredictOutcome::Scored)
                .map_err(decode_error),
            StatusCode::UNPROCESSABLE_ENTITY => serde_json::from_str::<RejectionBody>(&body)
                .map(|rejection| PredictOutcome::Rejected(rejection.detail))
                .map_err(decode_error),
            other => Ok(PredictOutcome::ServerError {
                status: other.as_u16(),
                body,
            }),
        }
    }

    pub async fn health(&self) -> Result<bool> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(transport_error)?;
        Ok(response.status().is_success())
    }
}

fn transport_error(err: reqwest::Error) -> ChurnError {
    let code = if err.is_timeout() {
        ErrorCode::CLIENT_TIMEOUT
    } else if err.is_connect() {
        ErrorCode::CLIENT_CONNECTION
    } else {
        ErrorCode::CLIENT_GENERIC
    };
    ChurnError::client(code, err.to_string()).with_source(err)
}

fn decode_error(err: serde_json::Error) -> ChurnError {
    ChurnError::client(ErrorCode::CLIENT_DECODE, "unexpected response body").with_source(err)
}

/// Human-readable rendering of an outcome
pub fn render_outcome(outcome: &PredictOutcome) -> String {
    match outcome {
        PredictOutcome::Scored(result) => {
            let verdict = match result.churn_label {
                ChurnLabel::Yes => "Customer is likely to churn",
                ChurnLabel::No => "Customer is likely to stay",
            };
            format!(
                "{}\nChurn probability: {:.2}%",
                verdict,
                result.churn_probability * 100.0
            )
        }
        PredictOutcome::Rejected(issues) => {
            let mut text = String::from("Input validation error:");
            for issue in issues {
                text.push_str("\n  - ");
                text.push_str(&issue.to_string());
            }
            text
        }
        PredictOutcome::ServerError { status, body } => {
            format!("Server error ({}): {}", status, body)
        }
    }
}
