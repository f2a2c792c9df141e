//! Feature materialization: derived features, one-hot expansion and schema reconciliation
//!
//! The output of [`vectorize`] always has exactly the training schema's columns,
//! in the training schema's order.

use tracing::debug;

use crate::error::Result;
use crate::schema::{fields, Level};

pub mod reconcile;
pub mod schema;
pub mod tenure;

pub use reconcile::{reconcile, FeatureVector, ProducedColumns, ReconcileReport, Reconciled};
pub use schema::{indicator_column, FeatureSchema};
pub use tenure::{DerivedFeatureSet, TenureGroup};

/// One-hot expand a derived record.
///
/// `tenure` is dropped (it only feeds `tenure_group`). Numeric fields keep their
/// own column; each categorical field contributes a single indicator column for
/// the level it holds.
pub fn produce_columns(derived: &DerivedFeatureSet) -> Result<ProducedColumns> {
    let record = derived.record();
    let mut columns = ProducedColumns::new();

    columns.insert(fields::SENIOR_CITIZEN, f64::from(record.senior_citizen()))?;
    columns.insert(fields::MONTHLY_CHARGES, record.monthly_charges())?;
    columns.insert(fields::TOTAL_CHARGES, record.total_charges())?;

    for (field, literal) in record.categorical_values() {
        columns.insert(indicator_column(field, literal), 1.0)?;
    }
    columns.insert(
        indicator_column(fields::TENURE_GROUP, derived.tenure_group().as_str()),
        1.0,
    )?;

    Ok(columns)
}

/// Build the model-ready vector for one record.
pub fn vectorize<'s>(
    derived: &DerivedFeatureSet,
    schema: &'s FeatureSchema,
) -> Result<FeatureVector<'s>> {
    let produced = produce_columns(derived)?;
    let Reconciled { vector, report } = reconcile(&produced, schema);

    debug!(
        produced = produced.len(),
        matched = report.matched,
        zero_filled = report.zero_filled,
        dropped = report.dropped.len(),
        "Reconciled feature columns"
    );
    if !report.dropped.is_empty() {
        debug!(columns = ?report.dropped, "Dropped columns absent from the training schema");
    }

    vector.verify()?;
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CustomerPayload;
    use crate::validation::validate_record;
    use serde_json::json;

    fn derive(payload: CustomerPayload) -> DerivedFeatureSet {
        DerivedFeatureSet::derive(validate_record(&payload.build()).unwrap())
    }

    #[test]
    fn test_example_record_produces_one_indicator_per_field() {
        let derived = derive(CustomerPayload::example());
        assert_eq!(derived.tenure_group(), TenureGroup::UpTo11);

        let produced = produce_columns(&derived).unwrap();
        // 3 numeric + 15 categorical + tenure_group
        assert_eq!(produced.len(), 19);
        assert_eq!(produced.get("MonthlyCharges"), Some(70.0));
        assert_eq!(produced.get("TotalCharges"), Some(350.0));
        assert_eq!(produced.get("SeniorCitizen"), Some(0.0));
        assert_eq!(produced.get("InternetService_Fiber optic"), Some(1.0));
        assert_eq!(produced.get("Contract_Month-to-month"), Some(1.0));
        assert_eq!(produced.get("tenure_group_1 - 11"), Some(1.0));
        assert_eq!(produced.get("tenure"), None);
        assert_eq!(produced.get("Contract_Two year"), None);
    }

    #[test]
    fn test_vectorize_against_full_reference_schema() {
        let schema = FeatureSchema::one_hot_reference();
        let derived = derive(CustomerPayload::example());

        let vector = vectorize(&derived, &schema).unwrap();

        assert_eq!(vector.len(), schema.len());
        assert_eq!(vector.get("Contract_Month-to-month"), Some(1.0));
        // levels this customer did not choose are explicit zeros
        assert_eq!(vector.get("Contract_One year"), Some(0.0));
        assert_eq!(vector.get("Contract_Two year"), Some(0.0));
        assert_eq!(vector.get("InternetService_DSL"), Some(0.0));
        // one hot per categorical field
        let hot = vector
            .named()
            .filter(|(name, value)| name.contains('_') && *value == 1.0)
            .count();
        assert_eq!(hot, 16);
    }

    #[test]
    fn test_vectorize_drops_columns_the_model_never_saw() {
        // a schema trained with drop-first encoding has no "gender_Female"
        let schema = FeatureSchema::new(
            vec![
                "TotalCharges".to_string(),
                "gender_Male".to_string(),
                "MonthlyCharges".to_string(),
            ],
            None,
        )
        .unwrap();
        let derived = derive(CustomerPayload::example());

        let vector = vectorize(&derived, &schema).unwrap();

        assert_eq!(vector.values(), &[350.0, 0.0, 70.0]);
    }

    #[test]
    fn test_tenure_bucket_feeds_the_vector() {
        let schema = FeatureSchema::one_hot_reference();
        let derived = derive(CustomerPayload::example().with(fields::TENURE, json!(72)));
        let vector = vectorize(&derived, &schema).unwrap();
        assert_eq!(vector.get("tenure_group_60 - 71"), Some(1.0));
        assert_eq!(vector.get("tenure_group_1 - 11"), Some(0.0));
    }
}
