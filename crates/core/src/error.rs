//! Unified error types for the click counter.
//!
//! Error codes:
//! - BANNER_001: Banner lookup errors
//! - INGEST_001: Intake errors
//! - VALID_001-003: Validation errors
//! - DB_001-003: Database errors

use thiserror::Error;

use crate::banner::BannerId;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Banner id is not a UUID
    InvalidBannerId,
    /// VALID_002: Timestamp is missing or not RFC 3339
    InvalidTimestamp,
    /// VALID_003: Range start is after range end
    InvalidRange,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidBannerId => "VALID_001",
            Self::InvalidTimestamp => "VALID_002",
            Self::InvalidRange => "VALID_003",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Database error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorCode {
    /// DB_001: Failed to store click counts
    StoreFailed,
    /// DB_002: Failed to look up a banner
    LookupFailed,
    /// DB_003: Failed to read statistics
    QueryFailed,
}

impl DbErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreFailed => "DB_001",
            Self::LookupFailed => "DB_002",
            Self::QueryFailed => "DB_003",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        500
    }
}

pub const BANNER_NOT_FOUND_CODE: &str = "BANNER_001";
pub const INGESTION_CANCELLED_CODE: &str = "INGEST_001";

/// Unified error type for the click counter.
#[derive(Debug, Error)]
pub enum Error {
    /// The banner id is not in the banner set.
    #[error("[BANNER_001] banner {0} not found")]
    BannerNotFound(BannerId),

    /// Shutdown or caller cancellation fired before the queue had room.
    #[error("[INGEST_001] click ingestion cancelled")]
    IngestionCancelled,

    /// Validation error with code.
    #[error("[{code}] {message}")]
    ValidationWithCode {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Database error with code.
    #[error("[{code}] {message}")]
    Database {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error with code.
    pub fn validation_code(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::ValidationWithCode {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a database error.
    pub fn database(code: DbErrorCode, msg: impl Into<String>) -> Self {
        Self::Database {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for the cancellation outcome of an enqueue.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::IngestionCancelled)
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BannerNotFound(_) => 404,
            Self::IngestionCancelled => 503,
            Self::ValidationWithCode { http_status, .. } => *http_status,
            Self::Database { http_status, .. } => *http_status,
            Self::Validation(_) => 400,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::BannerNotFound(_) => Some(BANNER_NOT_FOUND_CODE),
            Self::IngestionCancelled => Some(INGESTION_CANCELLED_CODE),
            Self::ValidationWithCode { code, .. } => Some(code),
            Self::Database { code, .. } => Some(code),
            _ => None,
        }
    }
}
