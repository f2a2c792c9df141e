//! Schema reconciliation
//!
//! Aligns whatever columns vectorization produced to the fixed training schema:
//! unknown columns are dropped, absent schema columns are zero-filled, and the
//! output order is the schema's order.

use std::collections::HashMap;

use crate::error::{ChurnError, ErrorCode, Result};

use super::schema::FeatureSchema;

/// Named numeric columns produced from one record, in no particular order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducedColumns {
    values: HashMap<String, f64>,
}

impl ProducedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. Producing the same column twice is an alignment fault.
    pub fn insert(&mut self, column: impl Into<String>, value: f64) -> Result<()> {
        let column = column.into();
        if self.values.contains_key(&column) {
            return Err(ChurnError::alignment(
                ErrorCode::ALIGNMENT_DUPLICATE_COLUMN,
                format!("column '{}' produced twice", column),
            ));
        }
        self.values.insert(column, value);
        Ok(())
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// The model-ready vector: one value per schema column, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<'s> {
    schema: &'s FeatureSchema,
    values: Vec<f64>,
}

impl<'s> FeatureVector<'s> {
    pub fn schema(&self) -> &'s FeatureSchema {
        self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).and_then(|i| self.values.get(i).copied())
    }

    /// `(column, value)` pairs in schema order.
    pub fn named(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Check the vector still matches its schema.
    pub fn verify(&self) -> Result<()> {
        if self.values.len() != self.schema.len() {
            return Err(ChurnError::alignment(
                ErrorCode::ALIGNMENT_LENGTH_MISMATCH,
                format!(
                    "vector has {} values but the schema has {} columns",
                    self.values.len(),
                    self.schema.len()
                ),
            ));
        }
        if let Some((column, value)) = self.named().find(|(_, v)| !v.is_finite()) {
            return Err(ChurnError::alignment(
                ErrorCode::ALIGNMENT_GENERIC,
                format!("column '{}' holds non-finite value {}", column, value),
            ));
        }
        Ok(())
    }
}

/// What reconciliation did to the produced columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Schema columns taken from the produced set
    pub matched: usize,
    /// Schema columns absent from the produced set, set to 0
    pub zero_filled: usize,
    /// Produced columns unknown to the schema, sorted
    pub dropped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<'s> {
    pub vector: FeatureVector<'s>,
    pub report: ReconcileReport,
}

/// Align `produced` to `schema`. Total over any produced column set.
pub fn reconcile<'s>(produced: &ProducedColumns, schema: &'s FeatureSchema) -> Reconciled<'s> {
    let mut matched = 0;
    let values: Vec<f64> = schema
        .columns()
        .iter()
        .map(|column| match produced.get(column) {
            Some(value) => {
                matched += 1;
                value
            }
            None => 0.0,
        })
        .collect();

    let mut dropped: Vec<String> = produced
        .iter()
        .filter(|(column, _)| !schema.contains(column))
        .map(|(column, _)| column.to_string())
        .collect();
    dropped.sort_unstable();

    Reconciled {
        report: ReconcileReport {
            matched,
            zero_filled: schema.len() - matched,
            dropped,
        },
        vector: FeatureVector { schema, values },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schema(columns: &[&str]) -> FeatureSchema {
        FeatureSchema::new(columns.iter().map(|c| c.to_string()).collect(), None).unwrap()
    }

    fn produced(pairs: &[(&str, f64)]) -> ProducedColumns {
        let mut columns = ProducedColumns::new();
        for (name, value) in pairs {
            columns.insert(*name, *value).unwrap();
        }
        columns
    }

    #[test]
    fn test_drops_unknown_and_zero_fills_missing() {
        let schema = schema(&["a", "b", "c", "d"]);
        let produced = produced(&[("d", 4.0), ("x", 9.0), ("b", 2.0)]);

        let Reconciled { vector, report } = reconcile(&produced, &schema);

        assert_eq!(vector.values(), &[0.0, 2.0, 0.0, 4.0]);
        assert_eq!(report.matched, 2);
        assert_eq!(report.zero_filled, 2);
        assert_eq!(report.dropped, vec!["x".to_string()]);
        assert!(vector.verify().is_ok());
    }

    #[test]
    fn test_order_follows_schema_not_production() {
        let schema = schema(&["z", "y", "x"]);
        let produced = produced(&[("x", 1.0), ("y", 2.0), ("z", 3.0)]);
        let reconciled = reconcile(&produced, &schema);
        let named: Vec<_> = reconciled.vector.named().collect();
        assert_eq!(named, vec![("z", 3.0), ("y", 2.0), ("x", 1.0)]);
    }

    #[test]
    fn test_empty_production_is_all_zero() {
        let schema = schema(&["a", "b"]);
        let reconciled = reconcile(&ProducedColumns::new(), &schema);
        assert_eq!(reconciled.vector.values(), &[0.0, 0.0]);
        assert_eq!(reconciled.report.zero_filled, 2);
    }

    #[test]
    fn test_duplicate_production_is_a_fault() {
        let mut columns = ProducedColumns::new();
        columns.insert("a", 1.0).unwrap();
        let err = columns.insert("a", 1.0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ALIGNMENT_DUPLICATE_COLUMN);
        assert!(err.is_internal_fault());
    }

    #[test]
    fn test_verify_rejects_non_finite_values() {
        let schema = schema(&["a"]);
        let reconciled = reconcile(&produced(&[("a", f64::NAN)]), &schema);
        assert_eq!(
            reconciled.vector.verify().unwrap_err().code(),
            ErrorCode::ALIGNMENT_GENERIC
        );
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let schema = schema(&["a", "b"]);
        let vector = FeatureVector {
            schema: &schema,
            values: vec![1.0],
        };
        assert_eq!(
            vector.verify().unwrap_err().code(),
            ErrorCode::ALIGNMENT_LENGTH_MISMATCH
        );
    }

    proptest! {
        #[test]
        fn test_output_shape_always_matches_schema(
            schema_cols in prop::collection::hash_set("[a-e]{1,3}", 1..20),
            produced_cols in prop::collection::hash_map("[a-e]{1,3}", -100.0f64..100.0, 0..30),
        ) {
            let schema = FeatureSchema::new(schema_cols.into_iter().collect(), None).unwrap();
            let mut columns = ProducedColumns::new();
            for (name, value) in &produced_cols {
                columns.insert(name.clone(), *value).unwrap();
            }

            let Reconciled { vector, report } = reconcile(&columns, &schema);

            prop_assert_eq!(vector.len(), schema.len());
            prop_assert!(vector.verify().is_ok());
            prop_assert_eq!(report.matched + report.zero_filled, schema.len());
            for (column, value) in vector.named() {
                let expected = produced_cols.get(column).copied().unwrap_or(0.0);
                prop_assert_eq!(value, expected);
            }
            for column in &report.dropped {
                prop_assert!(!schema.contains(column));
                prop_assert!(produced_cols.contains_key(column));
            }
        }
    }
}
