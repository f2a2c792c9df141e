//! The fixed, ordered training column set (`MODEL_FEATURES`)

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{ChurnError, ErrorCode, Result};
use crate::schema::fields;
use crate::schema::{Contract, Gender, InternetService, Level, MultipleLines, PaymentMethod, YesNo};

use super::tenure::TenureGroup;

/// Ordered column names the classifier was fit against.
///
/// Immutable once built; shared read-only by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty, blank or duplicated column names.
    ///
    /// `origin` names the artifact the columns came from, for error reporting.
    pub fn new(columns: Vec<String>, origin: Option<PathBuf>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ChurnError::artifact(
                ErrorCode::ARTIFACT_EMPTY_SCHEMA,
                "feature schema has no columns",
                origin,
            ));
        }

        let mut positions = HashMap::with_capacity(columns.len());
        for (index, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ChurnError::artifact(
                    ErrorCode::ARTIFACT_DUPLICATE_FEATURE,
                    format!("feature column {} has an empty name", index),
                    origin,
                ));
            }
            if positions.insert(name.clone(), index).is_some() {
                return Err(ChurnError::artifact(
                    ErrorCode::ARTIFACT_DUPLICATE_FEATURE,
                    format!("feature column '{}' appears more than once", name),
                    origin,
                ));
            }
        }

        Ok(Self { columns, positions })
    }

    /// Every column a full one-hot expansion of the record can produce, ordered
    /// the way a dummy-encoded training frame lays them out: numeric columns
    /// first, then each categorical field's levels in lexicographic order.
    pub fn one_hot_reference() -> Self {
        let mut columns: Vec<String> = [
            fields::SENIOR_CITIZEN,
            fields::MONTHLY_CHARGES,
            fields::TOTAL_CHARGES,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();

        let categorical: [(&str, Vec<&'static str>); 16] = [
            (fields::GENDER, Gender::literals()),
            (fields::PARTNER, YesNo::literals()),
            (fields::DEPENDENTS, YesNo::literals()),
            (fields::PHONE_SERVICE, YesNo::literals()),
            (fields::MULTIPLE_LINES, MultipleLines::literals()),
            (fields::INTERNET_SERVICE, InternetService::literals()),
            (fields::ONLINE_SECURITY, YesNo::literals()),
            (fields::ONLINE_BACKUP, YesNo::literals()),
            (fields::DEVICE_PROTECTION, YesNo::literals()),
            (fields::TECH_SUPPORT, YesNo::literals()),
            (fields::STREAMING_TV, YesNo::literals()),
            (fields::STREAMING_MOVIES, YesNo::literals()),
            (fields::CONTRACT, Contract::literals()),
            (fields::PAPERLESS_BILLING, YesNo::literals()),
            (fields::PAYMENT_METHOD, PaymentMethod::literals()),
            (fields::TENURE_GROUP, TenureGroup::literals()),
        ];

        for (field, mut literals) in categorical {
            literals.sort_unstable();
            columns.extend(literals.into_iter().map(|l| indicator_column(field, l)));
        }

        let positions = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { columns, positions }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }
}

/// Name of the one-hot indicator column for `field == literal`.
pub fn indicator_column(field: &str, literal: &str) -> String {
    format!("{}_{}", field, literal)
}
