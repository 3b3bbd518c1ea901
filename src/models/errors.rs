//! Centralized Error Handling Module
//!
//! Every failure in the scoring core carries a unique error code so that
//! callers (CLI, UI, batch jobs) can branch on it and log it consistently.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - INPUT_xxx: malformed rows or matrices
//! - TRAIN_xxx: training preconditions
//! - MODEL_xxx: model artifact problems
//! - STORE_xxx / LOAN_xxx: storage boundary

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Caller-facing remediation hint, if the code has one
    pub fn hint(&self) -> Option<&'static str> {
        self.code.remediation_hint()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if let Some(hint) = self.hint() {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Input Errors (1xx)
    // ============================================
    /// Raw row lacks a required numeric field
    InputMissingField,
    /// Raw row field is not convertible to f64
    InputNonNumeric,
    /// Shapes or label values are unusable
    InputInvalid,

    // ============================================
    // Training Errors (2xx)
    // ============================================
    /// Not enough labeled loans to train
    TrainInsufficientData,

    // ============================================
    // Model Errors (3xx)
    // ============================================
    /// No model artifact at the requested location
    ModelNotFound,
    /// Artifact exists but is malformed
    ModelInvalidArtifact,

    // ============================================
    // Storage Errors (4xx)
    // ============================================
    /// Filesystem failure while reading or writing an artifact
    StoreIo,
    /// Loan id not present in the repository
    LoanNotFound,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputMissingField => "INPUT_MISSING_FIELD",
            Self::InputNonNumeric => "INPUT_NON_NUMERIC",
            Self::InputInvalid => "INPUT_INVALID",

            Self::TrainInsufficientData => "TRAIN_INSUFFICIENT_DATA",

            Self::ModelNotFound => "MODEL_NOT_FOUND",
            Self::ModelInvalidArtifact => "MODEL_INVALID_ARTIFACT",

            Self::StoreIo => "STORE_IO",
            Self::LoanNotFound => "LOAN_NOT_FOUND",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Remediation hint shown to the operator
    pub fn remediation_hint(&self) -> Option<&'static str> {
        match self {
            Self::TrainInsufficientData => Some("seed or generate more labeled loans, then retrain"),
            Self::ModelNotFound => Some("train a model first"),
            Self::ModelInvalidArtifact => Some("retrain to overwrite the artifact"),
            _ => None,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Required field absent from a raw row
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::InputMissingField,
            format!("Missing required field: {}", field),
        )
    }

    /// Field present but not numeric
    pub fn non_numeric(field: &str, value: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InputNonNumeric,
            format!("Field {} is not numeric: {}", field, value),
        )
    }

    /// Invalid matrix / label input
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InputInvalid, msg)
    }

    /// Too few labeled loans
    pub fn insufficient_data(found: usize, required: usize) -> Self {
        Self::new(
            ErrorCode::TrainInsufficientData,
            format!(
                "Not enough labeled loans to train: found {}, need at least {}",
                found, required
            ),
        )
    }

    /// Model artifact missing
    pub fn model_not_found(location: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ModelNotFound,
            format!("Model not found at {}", location),
        )
    }

    /// Malformed model artifact
    pub fn invalid_artifact(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ModelInvalidArtifact, msg)
    }

    /// Loan not found
    pub fn loan_not_found(loan_id: u64) -> Self {
        Self::new(
            ErrorCode::LoanNotFound,
            format!("loan_id {} not found", loan_id),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::StoreIo, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ModelInvalidArtifact, "JSON parse error", err)
    }
}
