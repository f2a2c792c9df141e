//! Test data builders for customer payloads

use serde_json::{json, Map, Value};

use crate::schema::fields;

/// Builder for raw `/predict` request bodies
#[derive(Debug, Clone)]
pub struct CustomerPayload {
    body: Map<String, Value>,
}

impl Default for CustomerPayload {
    fn default() -> Self {
        Self::example()
    }
}

impl CustomerPayload {
    /// The reference customer: five months in, fiber optic, month-to-month.
    pub fn example() -> Self {
        let body = json!({
            "gender": "Female",
            "SeniorCitizen": 0,
            "Partner": "Yes",
            "Dependents": "No",
            "tenure": 5,
            "PhoneService": "Yes",
            "MultipleLines": "No",
            "InternetService": "Fiber optic",
            "OnlineSecurity": "No",
            "OnlineBackup": "No",
            "DeviceProtection": "No",
            "TechSupport": "No",
            "StreamingTV": "No",
            "StreamingMovies": "No",
            "Contract": "Month-to-month",
            "PaperlessBilling": "Yes",
            "PaymentMethod": "Electronic check",
            "MonthlyCharges": 70.0,
            "TotalCharges": 350.0
        });
        match body {
            Value::Object(body) => Self { body },
            _ => unreachable!("json! object literal"),
        }
    }

    /// A long-tenure, low-risk customer.
    pub fn loyal() -> Self {
        Self::example()
            .with(fields::TENURE, json!(70))
            .with(fields::CONTRACT, json!("Two year"))
            .with(fields::INTERNET_SERVICE, json!("DSL"))
            .with(fields::PAYMENT_METHOD, json!("Credit card (automatic)"))
            .with(fields::ONLINE_SECURITY, json!("Yes"))
            .with(fields::TECH_SUPPORT, json!("Yes"))
            .with(fields::MONTHLY_CHARGES, json!(55.5))
            .with(fields::TOTAL_CHARGES, json!(3885.0))
    }

    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.body.insert(field.to_string(), value);
        self
    }

    pub fn without(mut self, field: &str) -> Self {
        self.body.remove(field);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.body)
    }
}
