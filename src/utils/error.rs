use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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

    #[error("Master data error: {message}")]
    MasterDataError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    MasterData,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 程序退出碼，錯誤一律非零
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl SchemeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SchemeError::IoError(_) => ErrorCategory::Io,
            SchemeError::CsvError(_) | SchemeError::MasterDataError { .. } => {
                ErrorCategory::MasterData
            }
            SchemeError::SerializationError(_) => ErrorCategory::Output,
            SchemeError::ConfigError { .. }
            | SchemeError::ConfigValidationError { .. }
            | SchemeError::InvalidConfigValueError { .. }
            | SchemeError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::MasterData | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            SchemeError::IoError(e) => format!("Could not read or write a file: {}", e),
            SchemeError::CsvError(e) => format!("Master data file is not valid CSV: {}", e),
            SchemeError::SerializationError(e) => format!("Could not serialize output: {}", e),
            SchemeError::ConfigError { message } => format!("Configuration problem: {}", message),
            SchemeError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            SchemeError::InvalidConfigValueError { field, value, reason } => {
                format!("'{}' is not a valid value for '{}': {}", value, field, reason)
            }
            SchemeError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            SchemeError::MasterDataError { message } => {
                format!("Scheme master data is inconsistent: {}", message)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SchemeError::IoError(_) => "Check that the path exists and is readable/writable",
            SchemeError::CsvError(_) => {
                "Check the CSV header: product_code,customer_code,division,scheme_id,scheme_name,min_qty,free_qty,percent,valid_from,valid_to"
            }
            SchemeError::SerializationError(_) => "Retry with a different output format",
            SchemeError::ConfigError { .. } | SchemeError::ConfigValidationError { .. } => {
                "Make sure the file is valid TOML and matches the documented layout"
            }
            SchemeError::InvalidConfigValueError { .. } => "Correct the value and run again",
            SchemeError::MissingConfigError { .. } => "Add the missing field to the configuration",
            SchemeError::MasterDataError { .. } => {
                "Each row needs exactly one of customer_code/division and dates as YYYY-MM-DD"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemeError>;
