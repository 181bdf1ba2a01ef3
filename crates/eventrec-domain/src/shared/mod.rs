use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod transaction;
pub use transaction::{TransactionContext, UnitOfWork};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(UserId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    EventNotFound = 2001,
    AggregateNotFound = 2002,

    // Business Logic (3xxx)
    InvariantViolation = 3001,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    SerializationError = 4002,
    DecodeFailure = 4003,

    // Infrastructure (5xxx)
    StorageUnavailable = 5001,
    TransactionFailure = 5002,
    InfrastructureError = 5003,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::EventNotFound
            | ErrorCode::AggregateNotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidInput => ErrorSeverity::Info,

            ErrorCode::StorageUnavailable | ErrorCode::TransactionFailure => ErrorSeverity::Warning,

            ErrorCode::InvariantViolation
            | ErrorCode::DecodeFailure
            | ErrorCode::RepositoryError
            | ErrorCode::SerializationError
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,
        }
    }

    /// Check if error is recoverable by retrying the operation
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::StorageUnavailable | ErrorCode::TransactionFailure
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::StorageUnavailable(_) => ErrorCode::StorageUnavailable,
            DomainError::Transaction(_) => ErrorCode::TransactionFailure,
            DomainError::Decode(_) => ErrorCode::DecodeFailure,
            DomainError::InvariantViolation(_) => ErrorCode::InvariantViolation,
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::NotFound(_) => ErrorCode::EventNotFound,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
