/// Error code registry for churn-serve
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Artifact loading errors
/// - 3000-3999: Feature alignment errors
/// - 4000-4999: Scoring errors
/// - 5000-5999: Client errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;

    // Artifact loading errors (2000-2999)
    pub const ARTIFACT_GENERIC: u16 = 2000;
    pub const ARTIFACT_NOT_FOUND: u16 = 2001;
    pub const ARTIFACT_UNREADABLE: u16 = 2002;
    pub const ARTIFACT_MALFORMED: u16 = 2003;
    pub const ARTIFACT_EMPTY_SCHEMA: u16 = 2004;
    pub const ARTIFACT_DUPLICATE_FEATURE: u16 = 2005;
    pub const ARTIFACT_WIDTH_MISMATCH: u16 = 2006;
    pub const ARTIFACT_INVALID_MODEL: u16 = 2007;

    // Feature alignment errors (3000-3999)
    pub const ALIGNMENT_GENERIC: u16 = 3000;
    pub const ALIGNMENT_DUPLICATE_COLUMN: u16 = 3001;
    pub const ALIGNMENT_LENGTH_MISMATCH: u16 = 3002;

    // Scoring errors (4000-4999)
    pub const SCORING_GENERIC: u16 = 4000;
    pub const SCORING_WIDTH_MISMATCH: u16 = 4001;
    pub const SCORING_INVALID_LABEL: u16 = 4002;
    pub const SCORING_INVALID_PROBABILITY: u16 = 4003;
    pub const SCORING_MALFORMED_MODEL: u16 = 4004;

    // Client errors (5000-5999)
    pub const CLIENT_GENERIC: u16 = 5000;
    pub const CLIENT_CONNECTION: u16 = 5001;
    pub const CLIENT_TIMEOUT: u16 = 5002;
    pub const CLIENT_DECODE: u16 = 5003;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_IO: u16 = 9001;
    pub const OTHER_JSON: u16 = 9002;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_TOML => "Configuration file is not valid TOML",
        ErrorCode::CONFIG_INVALID_VALUE => "Configuration value is invalid",

        ErrorCode::ARTIFACT_GENERIC => "General artifact loading error",
        ErrorCode::ARTIFACT_NOT_FOUND => "Model or feature schema file not found",
        ErrorCode::ARTIFACT_UNREADABLE => "Model or feature schema file could not be read",
        ErrorCode::ARTIFACT_MALFORMED => "Artifact is not well-formed JSON of the expected shape",
        ErrorCode::ARTIFACT_EMPTY_SCHEMA => "Feature schema contains no columns",
        ErrorCode::ARTIFACT_DUPLICATE_FEATURE => "Feature schema contains a duplicate or empty column",
        ErrorCode::ARTIFACT_WIDTH_MISMATCH => "Model input width does not match the feature schema",
        ErrorCode::ARTIFACT_INVALID_MODEL => "Model artifact is structurally invalid",

        ErrorCode::ALIGNMENT_GENERIC => "General feature alignment fault",
        ErrorCode::ALIGNMENT_DUPLICATE_COLUMN => "A feature column was produced twice",
        ErrorCode::ALIGNMENT_LENGTH_MISMATCH => "Reconciled vector length differs from the schema",

        ErrorCode::SCORING_GENERIC => "General scoring fault",
        ErrorCode::SCORING_WIDTH_MISMATCH => "Feature vector width does not match the model",
        ErrorCode::SCORING_INVALID_LABEL => "Classifier returned a label outside {0, 1}",
        ErrorCode::SCORING_INVALID_PROBABILITY => "Classifier returned a probability outside [0, 1]",
        ErrorCode::SCORING_MALFORMED_MODEL => "Model structure could not be evaluated",

        ErrorCode::CLIENT_GENERIC => "General client error",
        ErrorCode::CLIENT_CONNECTION => "Prediction API is not reachable",
        ErrorCode::CLIENT_TIMEOUT => "Prediction API did not answer in time",
        ErrorCode::CLIENT_DECODE => "Prediction API answered with an unexpected body",

        ErrorCode::OTHER_GENERIC => "General error",
        ErrorCode::OTHER_IO => "I/O error",
        ErrorCode::OTHER_JSON => "JSON error",

        _ => "Unknown error code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_have_descriptions() {
        for code in [
            ErrorCode::CONFIG_INVALID_VALUE,
            ErrorCode::ARTIFACT_WIDTH_MISMATCH,
            ErrorCode::ALIGNMENT_LENGTH_MISMATCH,
            ErrorCode::SCORING_INVALID_PROBABILITY,
            ErrorCode::SCORING_MALFORMED_MODEL,
            ErrorCode::CLIENT_CONNECTION,
        ] {
            assert_ne!(describe_error_code(code), "Unknown error code");
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(describe_error_code(42), "Unknown error code");
    }
}
