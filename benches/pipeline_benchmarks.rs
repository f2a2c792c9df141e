//! Performance benchmarks for the per-request pipeline
//!
//! Measures validation alone, full vectorization and end-to-end scoring for
//! both bundled model families.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use churn_serve::artifacts::ModelArtifact;
use churn_serve::features::{vectorize, DerivedFeatureSet, FeatureSchema};
use churn_serve::scoring::{Classifier, DecisionTree, RandomForest};
use churn_serve::service::ChurnPredictor;
use churn_serve::testing::{logistic_artifact, CustomerPayload};
use churn_serve::validation::validate_record;
use std::hint::black_box;
use std::sync::Arc;

/// A forest of identical depth-1 trees splitting on `MonthlyCharges`.
fn forest(schema: &FeatureSchema, trees: usize) -> RandomForest {
    let split = schema.position("MonthlyCharges").unwrap_or(0) as i64;
    RandomForest {
        n_features: schema.len(),
        trees: (0..trees)
            .map(|i| DecisionTree {
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                feature: vec![split, -2, -2],
                threshold: vec![50.0 + i as f64 % 40.0, -2.0, -2.0],
                value: vec![[0.0, 0.0], [8.0, 2.0], [3.0, 7.0]],
            })
            .collect(),
    }
}

fn bench_validation(c: &mut Criterion) {
    let body = CustomerPayload::example().build();
    let schema = FeatureSchema::one_hot_reference();

    c.bench_function("validate_record", |b| {
        b.iter(|| validate_record(black_box(&body)).unwrap())
    });

    c.bench_function("validate_and_vectorize", |b| {
        b.iter(|| {
            let record = validate_record(black_box(&body)).unwrap();
            let derived = DerivedFeatureSet::derive(record);
            black_box(vectorize(&derived, &schema).unwrap().len());
        })
    });
}

fn bench_predict(c: &mut Criterion) {
    let body = CustomerPayload::example().build();
    let schema = Arc::new(FeatureSchema::one_hot_reference());
    let mut group = c.benchmark_group("predict");

    let logistic: Arc<dyn Classifier> = match logistic_artifact(&schema) {
        ModelArtifact::Logistic(model) => Arc::new(model),
        ModelArtifact::RandomForest(model) => Arc::new(model),
    };
    let predictor = ChurnPredictor::new(logistic, schema.clone()).unwrap();
    group.bench_function("logistic", |b| {
        b.iter(|| predictor.predict(black_box(&body)).unwrap())
    });

    for trees in &[10, 100, 500] {
        let predictor =
            ChurnPredictor::new(Arc::new(forest(&schema, *trees)), schema.clone()).unwrap();
        group.bench_with_input(
            BenchmarkId::new("random_forest", trees),
            &predictor,
            |b, predictor| b.iter(|| predictor.predict(black_box(&body)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_validation, bench_predict);
criterion_main!(benches);
