use crate::domain::model::ColumnRole;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML serialization error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Input file has no header row")]
    EmptyInput,

    #[error("Required column '{role}' not found in header row")]
    MissingColumn { role: ColumnRole },

    #[error("Row {line}: cannot decode coordinate '{value}': {reason}")]
    CoordinateError {
        line: usize,
        value: String,
        reason: String,
    },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Parse,
    Io,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::EmptyInput
            | EtlError::MissingColumn { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_) | EtlError::CoordinateError { .. } => ErrorCategory::Parse,
            EtlError::IoError(_) | EtlError::XmlError(_) | EtlError::ZipError(_) => {
                ErrorCategory::Io
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Parse => 3,
            ErrorCategory::Io => 4,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Parse => format!("Could not read target data: {}", self),
            ErrorCategory::Io => format!("File operation failed: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::MissingColumn { role } => format!(
                "Add a '{}' column to the header row, or map your column name to it under [headers] in the config file",
                role.label()
            ),
            EtlError::EmptyInput => "Check that the input file is a non-empty CSV".to_string(),
            EtlError::CoordinateError { .. } => {
                "Fix the coordinate in the input file or rerun with --skip-invalid-rows"
                    .to_string()
            }
            EtlError::CsvError(_) => {
                "Check that the file is comma-delimited with double-quoted fields".to_string()
            }
            EtlError::InvalidConfigValueError { field, .. }
            | EtlError::ConfigValidationError { field, .. } => {
                format!("Review the value of {}", field)
            }
            EtlError::IoError(_) => {
                "Check that the input exists and the output directory is writable".to_string()
            }
            EtlError::XmlError(_) | EtlError::ZipError(_) => {
                "Retry the conversion; if it keeps failing, report the input file".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
