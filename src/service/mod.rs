//! Request handling: validate → derive → vectorize → score → shape
//!
//! [`ChurnPredictor`] owns nothing mutable. It is built once at startup from the
//! loaded artifacts and shared by every request.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::artifacts::LoadedArtifacts;
use crate::error::{ChurnError, ErrorCode, Result};
use crate::features::{vectorize, DerivedFeatureSet, FeatureSchema};
use crate::scoring::{Classifier, PredictionResult, Scorer};
use crate::validation::{validate_record, ValidationErrors};

/// Why a prediction request produced no result
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// The input was unacceptable; nothing was computed
    #[error("request rejected: {0}")]
    Rejected(#[from] ValidationErrors),
    /// A server-side fault; never a partial or guessed prediction
    #[error(transparent)]
    Internal(#[from] ChurnError),
}

#[derive(Debug, Clone)]
pub struct ChurnPredictor {
    scorer: Scorer,
    schema: Arc<FeatureSchema>,
}

impl ChurnPredictor {
    /// Pair a classifier with the schema it was fit against.
    pub fn new(classifier: Arc<dyn Classifier>, schema: Arc<FeatureSchema>) -> Result<Self> {
        if classifier.n_features() != schema.len() {
            return Err(ChurnError::artifact(
                ErrorCode::ARTIFACT_WIDTH_MISMATCH,
                format!(
                    "classifier expects {} features, schema has {}",
                    classifier.n_features(),
                    schema.len()
                ),
                None,
            ));
        }
        Ok(Self {
            scorer: Scorer::new(classifier),
            schema,
        })
    }

    pub fn from_artifacts(artifacts: &LoadedArtifacts) -> Result<Self> {
        Self::new(artifacts.classifier.clone(), artifacts.schema.clone())
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.scorer.classifier()
    }

    /// Validate and derive without scoring.
    pub fn derive(&self, body: &Value) -> std::result::Result<DerivedFeatureSet, ValidationErrors> {
        let record = validate_record(body)?;
        Ok(DerivedFeatureSet::derive(record))
    }

    /// The reconciled feature vector for `body`, as `(column, value)` pairs.
    pub fn feature_vector(
        &self,
        body: &Value,
    ) -> std::result::Result<Vec<(String, f64)>, PredictError> {
        let derived = self.derive(body)?;
        let vector = vectorize(&derived, &self.schema)?;
        Ok(vector
            .named()
            .map(|(column, value)| (column.to_string(), value))
            .collect())
    }

    /// Run the full pipeline for one request body.
    pub fn predict(&self, body: &Value) -> std::result::Result<PredictionResult, PredictError> {
        let derived = self.derive(body)?;
        let result = self.score(&derived).inspect_err(|e| {
            error!(code = e.code(), error = %e, "Prediction failed after validation");
        })?;
        debug!(
            tenure_group = %derived.tenure_group(),
            churn_prediction = result.churn_prediction,
            churn_probability = result.churn_probability,
            "Scored customer"
        );
        Ok(result)
    }

    fn score(&self, derived: &DerivedFeatureSet) -> Result<PredictionResult> {
        let vector = vectorize(derived, &self.schema)?;
        let score = self.scorer.score(&vector)?;
        Ok(PredictionResult::from(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ModelArtifact;
    use crate::schema::fields;
    use crate::scoring::{ChurnLabel, DecisionTree, RandomForest};
    use crate::testing::{logistic_artifact, CustomerPayload, FailingClassifier, StubClassifier};
    use serde_json::json;

    fn predictor() -> ChurnPredictor {
        let schema = FeatureSchema::one_hot_reference();
        let ModelArtifact::Logistic(model) = logistic_artifact(&schema) else {
            unreachable!()
        };
        ChurnPredictor::new(Arc::new(model), Arc::new(schema)).unwrap()
    }

    #[test]
    fn test_example_end_to_end() {
        let result = predictor()
            .predict(&CustomerPayload::example().build())
            .unwrap();

        assert_eq!(result.churn_prediction, 1);
        assert_eq!(result.churn_label, ChurnLabel::Yes);
        assert!((0.0..=1.0).contains(&result.churn_probability));
        let scaled = result.churn_probability * 10_000.0;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }

    #[test]
    fn test_label_matches_prediction_for_low_risk_customer() {
        let result = predictor().predict(&CustomerPayload::loyal().build()).unwrap();
        assert_eq!(result.churn_prediction, 0);
        assert_eq!(result.churn_label, ChurnLabel::No);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let predictor = predictor();
        let body = CustomerPayload::example().build();
        assert_eq!(
            predictor.predict(&body).unwrap(),
            predictor.predict(&body).unwrap()
        );
    }

    #[test]
    fn test_rejection_short_circuits_before_scoring() {
        let schema = Arc::new(FeatureSchema::one_hot_reference());
        let stub = Arc::new(StubClassifier::new(schema.len(), 1, 0.9));
        let predictor = ChurnPredictor::new(stub.clone(), schema).unwrap();

        let body = CustomerPayload::example()
            .with(fields::INTERNET_SERVICE, json!("Cable"))
            .build();
        match predictor.predict(&body) {
            Err(PredictError::Rejected(errors)) => {
                assert!(errors.has_field(fields::INTERNET_SERVICE))
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(stub.calls(), 0);

        predictor.predict(&CustomerPayload::example().build()).unwrap();
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_classifier_failure_is_internal() {
        let schema = Arc::new(FeatureSchema::one_hot_reference());
        let failing = Arc::new(FailingClassifier {
            n_features: schema.len(),
        });
        let predictor = ChurnPredictor::new(failing, schema).unwrap();

        match predictor.predict(&CustomerPayload::example().build()) {
            Err(PredictError::Internal(err)) => assert!(err.is_internal_fault()),
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_forest_is_internal_not_a_panic() {
        let schema = Arc::new(FeatureSchema::one_hot_reference());
        let forest = RandomForest {
            n_features: schema.len(),
            trees: vec![DecisionTree {
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                feature: vec![999, -2, -2],
                threshold: vec![0.5, -2.0, -2.0],
                value: vec![[0.0, 0.0], [9.0, 1.0], [2.0, 8.0]],
            }],
        };
        let predictor = ChurnPredictor::new(Arc::new(forest), schema).unwrap();

        match predictor.predict(&CustomerPayload::example().build()) {
            Err(PredictError::Internal(err)) => {
                assert_eq!(err.code(), ErrorCode::SCORING_MALFORMED_MODEL);
                assert!(err.is_internal_fault());
            }
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_classifier_is_refused() {
        let schema = Arc::new(FeatureSchema::one_hot_reference());
        let stub = Arc::new(StubClassifier::new(schema.len() + 1, 0, 0.1));
        let err = ChurnPredictor::new(stub, schema).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ARTIFACT_WIDTH_MISMATCH);
    }

    #[test]
    fn test_feature_vector_is_schema_shaped() {
        let predictor = predictor();
        let vector = predictor
            .feature_vector(&CustomerPayload::example().build())
            .unwrap();
        let names: Vec<&str> = vector.iter().map(|(c, _)| c.as_str()).collect();
        let expected: Vec<&str> = predictor.schema().columns().iter().map(String::as_str).collect();
        assert_eq!(names, expected);
    }
}
