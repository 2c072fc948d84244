use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Format error: {message}")]
    FormatError { message: String },

    #[error("Parse error in column '{column}' at row {row}: cannot parse '{value}' ({reason})")]
    ParseError {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("Empty result: no rows left after {stage}")]
    EmptyResultError { stage: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn format(message: impl Into<String>) -> Self {
        EtlError::FormatError {
            message: message.into(),
        }
    }

    pub fn empty(stage: impl Into<String>) -> Self {
        EtlError::EmptyResultError {
            stage: stage.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::FormatError { .. } | EtlError::SerializationError(_) => ErrorCategory::Input,
            EtlError::ParseError { .. } | EtlError::EmptyResultError { .. } => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) | EtlError::RenderError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 程式結束碼：資料錯誤 1、配置錯誤 2、系統錯誤 3
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            EtlError::RenderError { .. } => {
                "Check the chart sizes and report settings in the configuration".to_string()
            }
            EtlError::SerializationError(_) => {
                "Make sure the input file is valid JSON".to_string()
            }
            EtlError::FormatError { .. } => {
                "The input must be an object with 'fields' (each with an 'id') and 'records' rows matching the field count".to_string()
            }
            EtlError::ParseError { column, .. } => format!(
                "Fix the value in column '{}' or adjust the expected format in the configuration",
                column
            ),
            EtlError::EmptyResultError { .. } => {
                "No record has a duration inside the configured bounds; check the time columns or widen [interval] min_minutes/max_minutes".to_string()
            }
            EtlError::ConfigError { .. } | EtlError::ConfigValidationError { .. } => {
                "Review the TOML configuration file".to_string()
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The input document could not be read: {}", self),
            ErrorCategory::Data => format!("The data could not be processed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for EtlError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        EtlError::RenderError {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
