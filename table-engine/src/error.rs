//! FILENAME: table-engine/src/error.rs

use thiserror::Error;

/// Failures raised by label lookups, reshaping and calculated fields.
/// Every message names the offending label, level or field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// Wrong axis depth or cardinality (single-level where multi-level is
    /// required, zero-sized table, grid that does not match its axes).
    #[error("Shape error: {0}")]
    Shape(String),

    /// A requested label, level, field or order entry is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A value of the wrong kind, e.g. text where a number is required.
    #[error("Type error: {0}")]
    Type(String),

    /// A malformed argument (empty search, duplicate label, conflicting fields).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type TableResult<T> = Result<T, TableError>;
