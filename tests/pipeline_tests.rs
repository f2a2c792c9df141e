//! End-to-end pipeline tests over on-disk artifacts.

use churn_serve::artifacts::{load_artifacts, ModelArtifact};
use churn_serve::features::FeatureSchema;
use churn_serve::schema::fields;
use churn_serve::scoring::{ChurnLabel, DecisionTree, RandomForest};
use churn_serve::service::{ChurnPredictor, PredictError};
use churn_serve::testing::{logistic_artifact, ArtifactFixture, CustomerPayload};
use proptest::prelude::*;
use serde_json::json;

fn predictor_from(fixture: &ArtifactFixture) -> ChurnPredictor {
    let artifacts = load_artifacts(&fixture.model_path, &fixture.features_path).unwrap();
    ChurnPredictor::from_artifacts(&artifacts).unwrap()
}

/// One stump on the month-to-month indicator: 80% churn when set, 10% otherwise.
fn contract_forest(schema: &FeatureSchema) -> ModelArtifact {
    let split = schema.position("Contract_Month-to-month").unwrap() as i64;
    ModelArtifact::RandomForest(RandomForest {
        n_features: schema.len(),
        trees: vec![DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![split, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![[0.0, 0.0], [9.0, 1.0], [2.0, 8.0]],
        }],
    })
}

#[test]
fn test_logistic_artifacts_end_to_end() {
    let fixture = ArtifactFixture::new().unwrap();
    let predictor = predictor_from(&fixture);

    let churner = predictor
        .predict(&CustomerPayload::example().build())
        .unwrap();
    let loyal = predictor.predict(&CustomerPayload::loyal().build()).unwrap();

    assert_eq!(churner.churn_label, ChurnLabel::Yes);
    assert_eq!(loyal.churn_label, ChurnLabel::No);
    assert!(churner.churn_probability > loyal.churn_probability);
}

#[test]
fn test_forest_artifacts_end_to_end() {
    let schema = FeatureSchema::one_hot_reference();
    let fixture = ArtifactFixture::with_model(&contract_forest(&schema), &schema).unwrap();
    let predictor = predictor_from(&fixture);

    let monthly = predictor
        .predict(&CustomerPayload::example().build())
        .unwrap();
    assert_eq!(monthly.churn_prediction, 1);
    assert_eq!(monthly.churn_probability, 0.8);

    let yearly = predictor
        .predict(
            &CustomerPayload::example()
                .with(fields::CONTRACT, json!("One year"))
                .build(),
        )
        .unwrap();
    assert_eq!(yearly.churn_prediction, 0);
    assert_eq!(yearly.churn_probability, 0.1);
}

#[test]
fn test_reduced_training_schema_drops_and_zero_fills() {
    // trained without the gender indicators and with a column the pipeline never produces
    let reference = FeatureSchema::one_hot_reference();
    let mut columns: Vec<String> = reference
        .columns()
        .iter()
        .filter(|column| !column.starts_with("gender_"))
        .cloned()
        .collect();
    columns.push("Region_North".to_string());
    let schema = FeatureSchema::new(columns, None).unwrap();

    let fixture = ArtifactFixture::with_model(&logistic_artifact(&schema), &schema).unwrap();
    let predictor = predictor_from(&fixture);

    let vector = predictor
        .feature_vector(&CustomerPayload::example().build())
        .unwrap();
    assert_eq!(vector.len(), schema.len());
    assert!(vector.iter().all(|(column, _)| !column.starts_with("gender_")));
    assert_eq!(vector.last().unwrap(), &("Region_North".to_string(), 0.0));

    assert!(predictor
        .predict(&CustomerPayload::example().build())
        .is_ok());
}

#[test]
fn test_tenure_bucket_reaches_the_vector() {
    let fixture = ArtifactFixture::new().unwrap();
    let predictor = predictor_from(&fixture);

    for (tenure, column) in [
        (0, "tenure_group_1 - 11"),
        (12, "tenure_group_12 - 23"),
        (59, "tenure_group_48 - 59"),
        (72, "tenure_group_60 - 71"),
    ] {
        let body = CustomerPayload::example()
            .with(fields::TENURE, json!(tenure))
            .with(fields::TOTAL_CHARGES, json!(5000.0))
            .build();
        let vector = predictor.feature_vector(&body).unwrap();
        let hot: Vec<&str> = vector
            .iter()
            .filter(|(name, value)| name.starts_with("tenure_group_") && *value == 1.0)
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(hot, vec![column], "tenure {}", tenure);
    }
}

#[test]
fn test_rejection_is_reported_not_scored() {
    let fixture = ArtifactFixture::new().unwrap();
    let predictor = predictor_from(&fixture);

    let body = CustomerPayload::example()
        .with(fields::SENIOR_CITIZEN, json!(2))
        .build();
    match predictor.predict(&body) {
        Err(PredictError::Rejected(errors)) => {
            assert_eq!(errors.field_names(), vec![fields::SENIOR_CITIZEN]);
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

fn valid_customer() -> impl Strategy<Value = serde_json::Value> {
    let yes_no = || prop::sample::select(vec!["Yes", "No"]);
    let categorical = (
        prop::sample::select(vec!["Male", "Female"]),
        yes_no(),
        yes_no(),
        yes_no(),
        prop::sample::select(vec!["Yes", "No", "No phone service"]),
        prop::sample::select(vec!["DSL", "Fiber optic", "No"]),
        (yes_no(), yes_no(), yes_no(), yes_no(), yes_no(), yes_no()),
        prop::sample::select(vec!["Month-to-month", "One year", "Two year"]),
        yes_no(),
        prop::sample::select(vec![
            "Electronic check",
            "Mailed check",
            "Bank transfer (automatic)",
            "Credit card (automatic)",
        ]),
    );
    let numeric = (0u8..=1, 0u8..=72, 1.0f64..150.0, 0.0f64..8000.0);

    (categorical, numeric).prop_map(
        |(
            (gender, partner, dependents, phone, lines, internet, addons, contract, paperless, payment),
            (senior, tenure, monthly, extra),
        )| {
            let (security, backup, protection, support, tv, movies) = addons;
            json!({
                "gender": gender,
                "SeniorCitizen": senior,
                "Partner": partner,
                "Dependents": dependents,
                "tenure": tenure,
                "PhoneService": phone,
                "MultipleLines": lines,
                "InternetService": internet,
                "OnlineSecurity": security,
                "OnlineBackup": backup,
                "DeviceProtection": protection,
                "TechSupport": support,
                "StreamingTV": tv,
                "StreamingMovies": movies,
                "Contract": contract,
                "PaperlessBilling": paperless,
                "PaymentMethod": payment,
                "MonthlyCharges": monthly,
                "TotalCharges": monthly + extra,
            })
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_valid_records_score_in_contract(body in valid_customer()) {
        let predictor = ChurnPredictor::new(
            std::sync::Arc::new(match logistic_artifact(&FeatureSchema::one_hot_reference()) {
                ModelArtifact::Logistic(model) => model,
                ModelArtifact::RandomForest(_) => unreachable!(),
            }),
            std::sync::Arc::new(FeatureSchema::one_hot_reference()),
        ).unwrap();

        let vector = predictor.feature_vector(&body).unwrap();
        prop_assert_eq!(vector.len(), predictor.schema().len());
        // numeric columns plus one indicator per categorical field and the tenure bucket
        let hot = vector.iter().filter(|(name, value)| {
            *value == 1.0
                && name.as_str() != fields::SENIOR_CITIZEN
                && name.as_str() != fields::MONTHLY_CHARGES
                && name.as_str() != fields::TOTAL_CHARGES
        }).count();
        prop_assert_eq!(hot, 16);

        let result = predictor.predict(&body).unwrap();
        prop_assert!((0.0..=1.0).contains(&result.churn_probability));
        prop_assert_eq!(result.churn_prediction == 1, result.churn_label == ChurnLabel::Yes);
        prop_assert_eq!(predictor.predict(&body).unwrap(), result);
    }
}
