//! Wire names of the raw input fields

pub const GENDER: &str = "gender";
pub const SENIOR_CITIZEN: &str = "SeniorCitizen";
pub const PARTNER: &str = "Partner";
pub const DEPENDENTS: &str = "Dependents";
pub const TENURE: &str = "tenure";
pub const PHONE_SERVICE: &str = "PhoneService";
pub const MULTIPLE_LINES: &str = "MultipleLines";
pub const INTERNET_SERVICE: &str = "InternetService";
pub const ONLINE_SECURITY: &str = "OnlineSecurity";
pub const ONLINE_BACKUP: &str = "OnlineBackup";
pub const DEVICE_PROTECTION: &str = "DeviceProtection";
pub const TECH_SUPPORT: &str = "TechSupport";
pub const STREAMING_TV: &str = "StreamingTV";
pub const STREAMING_MOVIES: &str = "StreamingMovies";
pub const CONTRACT: &str = "Contract";
pub const PAPERLESS_BILLING: &str = "PaperlessBilling";
pub const PAYMENT_METHOD: &str = "PaymentMethod";
pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
pub const TOTAL_CHARGES: &str = "TotalCharges";

/// Derived from `tenure`, never accepted as input.
pub const TENURE_GROUP: &str = "tenure_group";

/// All 19 raw input fields, in wire order.
pub const RAW_FIELDS: [&str; 19] = [
    GENDER,
    SENIOR_CITIZEN,
    PARTNER,
    DEPENDENTS,
    TENURE,
    PHONE_SERVICE,
    MULTIPLE_LINES,
    INTERNET_SERVICE,
    ONLINE_SECURITY,
    ONLINE_BACKUP,
    DEVICE_PROTECTION,
    TECH_SUPPORT,
    STREAMING_TV,
    STREAMING_MOVIES,
    CONTRACT,
    PAPERLESS_BILLING,
    PAYMENT_METHOD,
    MONTHLY_CHARGES,
    TOTAL_CHARGES,
];
