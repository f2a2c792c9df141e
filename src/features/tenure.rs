//! Tenure bucketing
//!
//! Buckets are half-open `[lo, hi)` except the last, which also holds 72.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{Level, RawCustomerRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenureGroup {
    #[serde(rename = "1 - 11")]
    UpTo11,
    #[serde(rename = "12 - 23")]
    From12To23,
    #[serde(rename = "24 - 35")]
    From24To35,
    #[serde(rename = "36 - 47")]
    From36To47,
    #[serde(rename = "48 - 59")]
    From48To59,
    #[serde(rename = "60 - 71")]
    From60,
}

impl TenureGroup {
    /// Bucket a validated tenure in months.
    pub fn from_months(tenure: u8) -> Self {
        match tenure {
            0..=11 => Self::UpTo11,
            12..=23 => Self::From12To23,
            24..=35 => Self::From24To35,
            36..=47 => Self::From36To47,
            48..=59 => Self::From48To59,
            _ => Self::From60,
        }
    }
}

impl Level for TenureGroup {
    const ALL: &'static [Self] = &[
        Self::UpTo11,
        Self::From12To23,
        Self::From24To35,
        Self::From36To47,
        Self::From48To59,
        Self::From60,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::UpTo11 => "1 - 11",
            Self::From12To23 => "12 - 23",
            Self::From24To35 => "24 - 35",
            Self::From36To47 => "36 - 47",
            Self::From48To59 => "48 - 59",
            Self::From60 => "60 - 71",
        }
    }
}

impl fmt::Display for TenureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated record extended with its derived features. Never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatureSet {
    record: RawCustomerRecord,
    tenure_group: TenureGroup,
}

impl DerivedFeatureSet {
    /// Compute derived features from the validated record only.
    pub fn derive(record: RawCustomerRecord) -> Self {
        let tenure_group = TenureGroup::from_months(record.tenure());
        Self {
            record,
            tenure_group,
        }
    }

    pub fn record(&self) -> &RawCustomerRecord {
        &self.record
    }

    pub fn tenure_group(&self) -> TenureGroup {
        self.tenure_group
    }
}
