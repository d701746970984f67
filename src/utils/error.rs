use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartTaxError {
    #[error("Tax service unavailable: {message}")]
    TaxServiceUnavailable {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid tax response: {message}")]
    InvalidTaxResponse { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CartTaxError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TaxServiceUnavailable { .. } => ErrorCategory::Network,
            Self::InvalidTaxResponse { .. } => ErrorCategory::Data,
            Self::ValidationError { .. } => ErrorCategory::Input,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // the service may come back, so a rerun can succeed
            Self::TaxServiceUnavailable { .. } => ErrorSeverity::Medium,
            Self::InvalidTaxResponse { .. } | Self::ValidationError { .. } => ErrorSeverity::High,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::TaxServiceUnavailable { status: Some(code), .. } => format!(
                "The tax service answered with HTTP {}; check the endpoint and try again later",
                code
            ),
            Self::TaxServiceUnavailable { status: None, .. } => {
                "Check network connectivity and that the tax service endpoint is reachable".to_string()
            }
            Self::InvalidTaxResponse { .. } => {
                "The tax service must answer with a JSON body like {\"amount\": 7}".to_string()
            }
            Self::ValidationError { .. } => {
                "Line items are written as id:quantity:unit_price with a non-negative price".to_string()
            }
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the configuration", field)
            }
            Self::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::TaxServiceUnavailable { .. } => {
                "Could not reach the tax service, no total was computed".to_string()
            }
            Self::InvalidTaxResponse { .. } => {
                "The tax service sent a response that could not be understood".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CartTaxError>;
