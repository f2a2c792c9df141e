//! Pure validation of untrusted customer input
//!
//! Turns an untyped JSON object into a [`RawCustomerRecord`] or a complete list of
//! everything wrong with it. Validation is all-or-nothing and has no side effects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::schema::fields;
use crate::schema::{
    Contract, Gender, InternetService, Level, MultipleLines, PaymentMethod, RawCustomerRecord,
    YesNo,
};

/// Pseudo-field used when the request body itself is unusable.
pub const BODY_FIELD: &str = "body";

pub const TENURE_MIN: i64 = 0;
pub const TENURE_MAX: i64 = 72;

/// Why a single field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    /// Required field absent
    Missing,
    /// Wrong JSON type (string where a number is expected, null, ...)
    Type,
    /// Literal outside the field's closed enumeration
    Enum,
    /// Number outside the allowed range
    Range,
    /// Body is not a JSON object
    InvalidBody,
}

/// Cross-field rules evaluated after field-level validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessRule {
    /// Accumulated billing cannot be less than one month's charge
    TotalChargesAtLeastMonthlyCharges,
}

impl BusinessRule {
    pub fn fields(self) -> Vec<String> {
        match self {
            Self::TotalChargesAtLeastMonthlyCharges => vec![
                fields::TOTAL_CHARGES.to_string(),
                fields::MONTHLY_CHARGES.to_string(),
            ],
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::TotalChargesAtLeastMonthlyCharges => {
                "TotalCharges cannot be less than MonthlyCharges"
            }
        }
    }
}

/// One reason a request was rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    Field {
        field: String,
        code: FieldErrorCode,
        message: String,
    },
    BusinessRule {
        rule: BusinessRule,
        fields: Vec<String>,
        message: String,
    },
}

impl ValidationIssue {
    pub fn field(field: &str, code: FieldErrorCode, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.to_string(),
            code,
            message: message.into(),
        }
    }

    pub fn business_rule(rule: BusinessRule) -> Self {
        Self::BusinessRule {
            rule,
            fields: rule.fields(),
            message: rule.message().to_string(),
        }
    }

    pub fn is_business_rule(&self) -> bool {
        matches!(self, Self::BusinessRule { .. })
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { field, message, .. } => write!(f, "{}: {}", field, message),
            Self::BusinessRule { message, .. } => f.write_str(message),
        }
    }
}

/// Every issue found in one request, field issues first in wire order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, thiserror::Error)]
#[error("{} validation error(s): {}", .issues.len(), summarize(.issues))]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Names of the fields rejected at field level
    pub fn field_names(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|issue| match issue {
                ValidationIssue::Field { field, .. } => Some(field.as_str()),
                ValidationIssue::BusinessRule { .. } => None,
            })
            .collect()
    }

    pub fn violated_rules(&self) -> Vec<BusinessRule> {
        self.issues
            .iter()
            .filter_map(|issue| match issue {
                ValidationIssue::BusinessRule { rule, .. } => Some(*rule),
                ValidationIssue::Field { .. } => None,
            })
            .collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field_names().contains(&field)
    }
}

/// Lower bound on a float field
#[derive(Debug, Clone, Copy)]
enum FloatBound {
    Positive,
    NonNegative,
}

/// Reads typed fields out of a JSON object, recording every failure
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            issues: Vec::new(),
        }
    }

    fn add_error(&mut self, field: &str, code: FieldErrorCode, message: impl Into<String>) {
        self.issues.push(ValidationIssue::field(field, code, message));
    }

    fn present(&mut self, field: &str) -> Option<&'a Value> {
        match self.object.get(field) {
            Some(value) => Some(value),
            None => {
                self.add_error(field, FieldErrorCode::Missing, "Field required");
                None
            }
        }
    }

    fn categorical<T: Level>(&mut self, field: &str) -> Option<T> {
        let value = self.present(field)?;
        let Some(literal) = value.as_str() else {
            self.add_error(field, FieldErrorCode::Type, "Input should be a string");
            return None;
        };
        match T::parse(literal) {
            Some(level) => Some(level),
            None => {
                let allowed = T::literals()
                    .iter()
                    .map(|l| format!("'{}'", l))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.add_error(
                    field,
                    FieldErrorCode::Enum,
                    format!("Input should be one of {}, got '{}'", allowed, literal),
                );
                None
            }
        }
    }

    fn integer(&mut self, field: &str, min: i64, max: i64) -> Option<u8> {
        let value = self.present(field)?;
        // integral floats such as 5.0 are accepted; fractional ones are not
        let parsed = value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        });
        let Some(number) = parsed else {
            self.add_error(field, FieldErrorCode::Type, "Input should be a valid integer");
            return None;
        };
        if number < min || number > max {
            self.add_error(
                field,
                FieldErrorCode::Range,
                format!(
                    "Input should be between {} and {} inclusive, got {}",
                    min, max, number
                ),
            );
            return None;
        }
        u8::try_from(number).ok()
    }

    fn float(&mut self, field: &str, bound: FloatBound) -> Option<f64> {
        let value = self.present(field)?;
        let Some(number) = value.as_f64().filter(|f| f.is_finite()) else {
            self.add_error(field, FieldErrorCode::Type, "Input should be a finite number");
            return None;
        };
        let ok = match bound {
            FloatBound::Positive => number > 0.0,
            FloatBound::NonNegative => number >= 0.0,
        };
        if !ok {
            let expectation = match bound {
                FloatBound::Positive => "greater than 0",
                FloatBound::NonNegative => "greater than or equal to 0",
            };
            self.add_error(
                field,
                FieldErrorCode::Range,
                format!("Input should be {}, got {}", expectation, number),
            );
            return None;
        }
        Some(number)
    }
}

/// Validate an untyped request body into a [`RawCustomerRecord`].
///
/// Field checks run for every field so the error list is complete. The charges
/// rule runs only when both charge fields passed their own checks. Fields not in
/// the record schema are ignored.
pub fn validate_record(input: &Value) -> Result<RawCustomerRecord, ValidationErrors> {
    let Some(object) = input.as_object() else {
        return Err(ValidationErrors::single(ValidationIssue::field(
            BODY_FIELD,
            FieldErrorCode::InvalidBody,
            "Input should be a JSON object",
        )));
    };

    let mut reader = FieldReader::new(object);

    let gender = reader.categorical::<Gender>(fields::GENDER);
    let senior_citizen = reader.integer(fields::SENIOR_CITIZEN, 0, 1);
    let partner = reader.categorical::<YesNo>(fields::PARTNER);
    let dependents = reader.categorical::<YesNo>(fields::DEPENDENTS);
    let tenure = reader.integer(fields::TENURE, TENURE_MIN, TENURE_MAX);
    let phone_service = reader.categorical::<YesNo>(fields::PHONE_SERVICE);
    let multiple_lines = reader.categorical::<MultipleLines>(fields::MULTIPLE_LINES);
    let internet_service = reader.categorical::<InternetService>(fields::INTERNET_SERVICE);
    let online_security = reader.categorical::<YesNo>(fields::ONLINE_SECURITY);
    let online_backup = reader.categorical::<YesNo>(fields::ONLINE_BACKUP);
    let device_protection = reader.categorical::<YesNo>(fields::DEVICE_PROTECTION);
    let tech_support = reader.categorical::<YesNo>(fields::TECH_SUPPORT);
    let streaming_tv = reader.categorical::<YesNo>(fields::STREAMING_TV);
    let streaming_movies = reader.categorical::<YesNo>(fields::STREAMING_MOVIES);
    let contract = reader.categorical::<Contract>(fields::CONTRACT);
    let paperless_billing = reader.categorical::<YesNo>(fields::PAPERLESS_BILLING);
    let payment_method = reader.categorical::<PaymentMethod>(fields::PAYMENT_METHOD);
    let monthly_charges = reader.float(fields::MONTHLY_CHARGES, FloatBound::Positive);
    let total_charges = reader.float(fields::TOTAL_CHARGES, FloatBound::NonNegative);

    let mut issues = reader.issues;

    if let (Some(monthly), Some(total)) = (monthly_charges, total_charges) {
        if total < monthly {
            issues.push(ValidationIssue::business_rule(
                BusinessRule::TotalChargesAtLeastMonthlyCharges,
            ));
        }
    }

    match (
        gender,
        senior_citizen,
        partner,
        dependents,
        tenure,
        phone_service,
        multiple_lines,
        internet_service,
        online_security,
        online_backup,
        device_protection,
        tech_support,
        streaming_tv,
        streaming_movies,
        contract,
        paperless_billing,
        payment_method,
        monthly_charges,
        total_charges,
    ) {
        (
            Some(gender),
            Some(senior_citizen),
            Some(partner),
            Some(dependents),
            Some(tenure),
            Some(phone_service),
            Some(multiple_lines),
            Some(internet_service),
            Some(online_security),
            Some(online_backup),
            Some(device_protection),
            Some(tech_support),
            Some(streaming_tv),
            Some(streaming_movies),
            Some(contract),
            Some(paperless_billing),
            Some(payment_method),
            Some(monthly_charges),
            Some(total_charges),
        ) if issues.is_empty() => Ok(RawCustomerRecord {
            gender,
            senior_citizen,
            partner,
            dependents,
            tenure,
            phone_service,
            multiple_lines,
            internet_service,
            online_security,
            online_backup,
            device_protection,
            tech_support,
            streaming_tv,
            streaming_movies,
            contract,
            paperless_billing,
            payment_method,
            monthly_charges,
            total_charges,
        }),
        _ => Err(ValidationErrors { issues }),
    }
}
