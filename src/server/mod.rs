//! HTTP surface: `POST /predict`, `GET /health`, `GET /model`

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::artifacts::{LoadedArtifacts, ModelMetadata};
use crate::scoring::PredictionResult;
use crate::service::{ChurnPredictor, PredictError};
use crate::validation::{FieldErrorCode, ValidationErrors, ValidationIssue, BODY_FIELD};

/// Shared API state, read-only after startup
#[derive(Debug, Clone)]
pub struct ApiState {
    predictor: Arc<ChurnPredictor>,
    metadata: Arc<ModelMetadata>,
}

impl ApiState {
    pub fn new(predictor: ChurnPredictor, metadata: ModelMetadata) -> Self {
        Self {
            predictor: Arc::new(predictor),
            metadata: Arc::new(metadata),
        }
    }

    pub fn from_artifacts(artifacts: &LoadedArtifacts) -> crate::error::Result<Self> {
        Ok(Self::new(
            ChurnPredictor::from_artifacts(artifacts)?,
            artifacts.metadata(),
        ))
    }

    pub fn predictor(&self) -> &ChurnPredictor {
        &self.predictor
    }
}

/// The prediction API server
pub struct ChurnApiServer {
    state: ApiState,
    addr: SocketAddr,
    cors: bool,
}

impl ChurnApiServer {
    pub fn new(state: ApiState, addr: SocketAddr, cors: bool) -> Self {
        Self { state, addr, cors }
    }

    /// Bind and serve until Ctrl-C or SIGTERM.
    pub async fn start(self) -> Result<()> {
        let app = build_router(self.state, self.cors);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        info!("Starting churn prediction API on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Build the API router over `state`.
pub fn build_router(state: ApiState, cors: bool) -> Router {
    let router = Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/model", get(model_metadata))
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}

/// Error responses of the prediction endpoint
#[derive(Debug)]
pub enum ApiError {
    Unprocessable(ValidationErrors),
    Internal,
}

#[derive(Serialize)]
struct ErrorBody<T> {
    detail: T,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unprocessable(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorBody {
                    detail: errors.issues,
                }),
            )
                .into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    detail: "Internal Server Error",
                }),
            )
                .into_response(),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Rejected(errors) => Self::Unprocessable(errors),
            PredictError::Internal(_) => Self::Internal,
        }
    }
}

// API Handlers

async fn predict(
    State(state): State<ApiState>,
    body: Bytes,
) -> std::result::Result<Json<PredictionResult>, ApiError> {
    let request_id = Uuid::new_v4();
    info_span!("predict", %request_id).in_scope(|| handle_predict(&state, &body))
}

fn handle_predict(
    state: &ApiState,
    body: &[u8],
) -> std::result::Result<Json<PredictionResult>, ApiError> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        info!(error = %e, "Rejected unparseable request body");
        ApiError::Unprocessable(ValidationErrors::single(ValidationIssue::field(
            BODY_FIELD,
            FieldErrorCode::InvalidBody,
            format!("Request body is not valid JSON: {}", e),
        )))
    })?;

    match state.predictor.predict(&payload) {
        Ok(result) => Ok(Json(result)),
        Err(PredictError::Rejected(errors)) => {
            info!(errors = errors.len(), fields = ?errors.field_names(), "Rejected request");
            Err(ApiError::Unprocessable(errors))
        }
        Err(err @ PredictError::Internal(_)) => Err(err.into()),
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn model_metadata(State(state): State<ApiState>) -> Json<ModelMetadata> {
    Json(state.metadata.as_ref().clone())
}
