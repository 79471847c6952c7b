use crate::domain::model::{Month, PersonId, ReferenceKind};
use thiserror::Error;

/// Rejections raised by the allocation ledger. A failed call never changes
/// the ledger.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid commitment fraction {value}: must be a finite number between 0 and 1")]
    InvalidFraction { value: f64 },

    #[error("Total for person {person} exceeds 1 in month {month} (would be {total:.2})")]
    CapacityExceeded {
        person: PersonId,
        month: Month,
        total: f64,
    },

    #[error("Unknown {kind} id {id}")]
    UnknownReference { kind: ReferenceKind, id: u32 },

    #[error("Invalid month index {month}: months are numbered from 1")]
    InvalidMonth { month: Month },
}

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid reference data: {message}")]
    InvalidReferenceData { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Allocation,
    Network,
    Storage,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Retrying may succeed.
    Medium,
    /// The request or input has to change.
    High,
    Critical,
}

impl BudgetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BudgetError::Ledger(_) => ErrorCategory::Allocation,
            BudgetError::ApiError(_) | BudgetError::HttpStatus { .. } => ErrorCategory::Network,
            BudgetError::IoError(_) | BudgetError::ZipError(_) => ErrorCategory::Storage,
            BudgetError::CsvError(_)
            | BudgetError::SerializationError(_)
            | BudgetError::InvalidReferenceData { .. } => ErrorCategory::Data,
            BudgetError::ConfigError { .. }
            | BudgetError::ConfigValidationError { .. }
            | BudgetError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BudgetError::ApiError(_) => ErrorSeverity::Medium,
            BudgetError::HttpStatus { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            BudgetError::IoError(_) | BudgetError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BudgetError::Ledger(LedgerError::InvalidFraction { .. }) => {
                "Enter a value between 0 and 1, or clear the cell"
            }
            BudgetError::Ledger(LedgerError::CapacityExceeded { .. }) => {
                "Lower this person's commitment in another work package for that month first"
            }
            BudgetError::Ledger(LedgerError::UnknownReference { .. }) => {
                "Reload reference data; the work package or person may have been deleted"
            }
            BudgetError::Ledger(LedgerError::InvalidMonth { .. }) => {
                "Month indices start at 1 (the project start month)"
            }
            BudgetError::ApiError(_) => "Check that the planner API is reachable and retry",
            BudgetError::HttpStatus { .. } => "Check the API endpoint and your access to it",
            BudgetError::IoError(_) | BudgetError::ZipError(_) => {
                "Check that the output directory exists and is writable"
            }
            BudgetError::CsvError(_) | BudgetError::SerializationError(_) => {
                "Check that the data files are valid JSON in the planner backend format"
            }
            BudgetError::InvalidReferenceData { .. } => {
                "Fix the offending person or work package in the planner backend"
            }
            BudgetError::ConfigError { .. }
            | BudgetError::ConfigValidationError { .. }
            | BudgetError::InvalidConfigValueError { .. } => {
                "Review the worksheet configuration file and command line options"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BudgetError::Ledger(LedgerError::CapacityExceeded {
                person,
                month,
                total,
            }) => format!(
                "Person {} would be committed {:.0}% in month {}; the limit is 100%",
                person,
                total * 100.0,
                month
            ),
            BudgetError::Ledger(e) => e.to_string(),
            BudgetError::ApiError(_) | BudgetError::HttpStatus { .. } => {
                format!("Could not talk to the planner API: {}", self)
            }
            BudgetError::IoError(_) | BudgetError::ZipError(_) => {
                format!("Could not read or write files: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_names_person_and_month() {
        let err = BudgetError::from(LedgerError::CapacityExceeded {
            person: PersonId(4),
            month: 7,
            total: 1.1,
        });
        assert_eq!(err.category(), ErrorCategory::Allocation);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.user_friendly_message(),
            "Person 4 would be committed 110% in month 7; the limit is 100%"
        );
        assert_eq!(
            err.to_string(),
            "Total for person 4 exceeds 1 in month 7 (would be 1.10)"
        );
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = BudgetError::HttpStatus {
            status: 503,
            url: "http://localhost/budget/".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = BudgetError::HttpStatus {
            status: 404,
            url: "http://localhost/budget/".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
