//! Raw customer record and the closed categorical domains of its fields
//!
//! Every categorical field is a tagged variant type; unknown literals can never
//! be represented, so they can never reach the one-hot step.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod fields;

/// A categorical domain with a fixed, ordered set of literal values.
pub trait Level: Copy + Eq + 'static {
    /// Every level of the domain, in declaration order.
    const ALL: &'static [Self];

    /// The exact literal spelling used on the wire and in column names.
    fn as_str(self) -> &'static str;

    /// Parse an exact literal. No trimming, no case folding.
    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|level| level.as_str() == value)
    }

    /// The allowed literals, for error messages.
    fn literals() -> Vec<&'static str> {
        Self::ALL.iter().map(|level| level.as_str()).collect()
    }
}

macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $literal:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $literal)]
                $variant,
            )+
        }

        impl Level for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $literal,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_enum! {
    Gender {
        Male => "Male",
        Female => "Female",
    }
}

closed_enum! {
    /// Shared domain of the plain yes/no flags and service add-ons
    YesNo {
        Yes => "Yes",
        No => "No",
    }
}

closed_enum! {
    MultipleLines {
        Yes => "Yes",
        No => "No",
        NoPhoneService => "No phone service",
    }
}

closed_enum! {
    InternetService {
        Dsl => "DSL",
        FiberOptic => "Fiber optic",
        No => "No",
    }
}

closed_enum! {
    Contract {
        MonthToMonth => "Month-to-month",
        OneYear => "One year",
        TwoYear => "Two year",
    }
}

closed_enum! {
    PaymentMethod {
        ElectronicCheck => "Electronic check",
        MailedCheck => "Mailed check",
        BankTransfer => "Bank transfer (automatic)",
        CreditCard => "Credit card (automatic)",
    }
}

/// A validated customer record.
///
/// Only [`crate::validation::validate_record`] constructs one, so every value
/// held here already satisfies its field domain and the charges rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawCustomerRecord {
    #[serde(rename = "gender")]
    pub(crate) gender: Gender,
    #[serde(rename = "SeniorCitizen")]
    pub(crate) senior_citizen: u8,
    #[serde(rename = "Partner")]
    pub(crate) partner: YesNo,
    #[serde(rename = "Dependents")]
    pub(crate) dependents: YesNo,
    #[serde(rename = "tenure")]
    pub(crate) tenure: u8,
    #[serde(rename = "PhoneService")]
    pub(crate) phone_service: YesNo,
    #[serde(rename = "MultipleLines")]
    pub(crate) multiple_lines: MultipleLines,
    #[serde(rename = "InternetService")]
    pub(crate) internet_service: InternetService,
    #[serde(rename = "OnlineSecurity")]
    pub(crate) online_security: YesNo,
    #[serde(rename = "OnlineBackup")]
    pub(crate) online_backup: YesNo,
    #[serde(rename = "DeviceProtection")]
    pub(crate) device_protection: YesNo,
    #[serde(rename = "TechSupport")]
    pub(crate) tech_support: YesNo,
    #[serde(rename = "StreamingTV")]
    pub(crate) streaming_tv: YesNo,
    #[serde(rename = "StreamingMovies")]
    pub(crate) streaming_movies: YesNo,
    #[serde(rename = "Contract")]
    pub(crate) contract: Contract,
    #[serde(rename = "PaperlessBilling")]
    pub(crate) paperless_billing: YesNo,
    #[serde(rename = "PaymentMethod")]
    pub(crate) payment_method: PaymentMethod,
    #[serde(rename = "MonthlyCharges")]
    pub(crate) monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub(crate) total_charges: f64,
}

impl RawCustomerRecord {
    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn senior_citizen(&self) -> u8 {
        self.senior_citizen
    }

    /// Months as a customer, within `[0, 72]`.
    pub fn tenure(&self) -> u8 {
        self.tenure
    }

    pub fn internet_service(&self) -> InternetService {
        self.internet_service
    }

    pub fn contract(&self) -> Contract {
        self.contract
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn monthly_charges(&self) -> f64 {
        self.monthly_charges
    }

    pub fn total_charges(&self) -> f64 {
        self.total_charges
    }

    /// Every categorical field paired with its literal, in wire order.
    pub fn categorical_values(&self) -> [(&'static str, &'static str); 15] {
        [
            (fields::GENDER, self.gender.as_str()),
            (fields::PARTNER, self.partner.as_str()),
            (fields::DEPENDENTS, self.dependents.as_str()),
            (fields::PHONE_SERVICE, self.phone_service.as_str()),
            (fields::MULTIPLE_LINES, self.multiple_lines.as_str()),
            (fields::INTERNET_SERVICE, self.internet_service.as_str()),
            (fields::ONLINE_SECURITY, self.online_security.as_str()),
            (fields::ONLINE_BACKUP, self.online_backup.as_str()),
            (fields::DEVICE_PROTECTION, self.device_protection.as_str()),
            (fields::TECH_SUPPORT, self.tech_support.as_str()),
            (fields::STREAMING_TV, self.streaming_tv.as_str()),
            (fields::STREAMING_MOVIES, self.streaming_movies.as_str()),
            (fields::CONTRACT, self.contract.as_str()),
            (fields::PAPERLESS_BILLING, self.paperless_billing.as_str()),
            (fields::PAYMENT_METHOD, self.payment_method.as_str()),
        ]
    }
}
