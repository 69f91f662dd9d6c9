//! Error types for the pagesift crate.

use thiserror::Error;

use crate::op::{FilterOperator, ValueArity};

/// Errors that can occur when decoding, validating or executing a query.
///
/// Everything except [`QueryError::TypeMismatch`] is raised before the record
/// source is touched. A type mismatch is a per-record condition failure: the
/// compiled predicate treats it as "does not match".
#[derive(Debug, Error)]
pub enum QueryError {
    /// Operator token is neither a canonical name nor an alias.
    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),

    /// Filter tree is not well-formed.
    #[error("invalid filter structure at position {position}: {reason}")]
    InvalidFilterStructure { position: usize, reason: String },

    /// Condition value does not have the shape its operator needs.
    #[error("operator {operator} expects {expected}")]
    ValueShapeMismatch {
        operator: FilterOperator,
        expected: ValueArity,
    },

    /// Condition value cannot be used against the field.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidOperand { field: String, reason: String },

    /// Record field value cannot be compared with the operator.
    #[error("field '{field}' cannot be compared with {operator}")]
    TypeMismatch {
        field: String,
        operator: FilterOperator,
    },

    /// Negative page index.
    #[error("page index must not be negative, got {0}")]
    InvalidPageIndex(i64),

    /// Page size is zero, negative or above the configured maximum.
    #[error("invalid page size {0}")]
    InvalidPageSize(i64),

    /// Record source exceeds the configured maximum.
    #[error("record source holds {len} records, limit is {max}")]
    SourceTooLarge { len: usize, max: usize },

    /// Request JSON could not be decoded.
    #[error("invalid request: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for pagesift operations.
pub type Result<T> = std::result::Result<T, QueryError>;
