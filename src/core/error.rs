// Copyright 2026 Stratum Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for Stratum
//!
//! This module defines all error types used throughout the engine.

use thiserror::Error;

/// Result type alias for Stratum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Stratum operations
///
/// This enum covers all error cases including both sentinel errors
/// and structured errors with context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Table not found in the catalog
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Table already registered under this name
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Column not found in table schema
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// Duplicate column name in schema
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Cluster count must be a strictly positive power of two
    #[error("cluster count must be a power of two, got {0}")]
    InvalidClusterCount(usize),

    /// The table behind a statistics handle has been dropped
    #[error("statistics source table no longer exists")]
    TableGone,

    /// BETWEEN predicate is missing its second value
    #[error("operator BETWEEN takes two values, second is missing")]
    MissingPredicateValue,

    /// Operator output requested before execution
    #[error("operator '{0}' produced no output yet, call execute first")]
    OperatorNotExecuted(String),

    /// Operator executed a second time
    #[error("operator '{0}' already executed")]
    OperatorAlreadyExecuted(String),

    // =========================================================================
    // Type errors
    // =========================================================================
    /// Column value does not match the segment type
    #[error("type error: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Value conversion is not possible
    #[error("type error: cannot convert {from} to {to}")]
    TypeConversion { from: String, to: String },

    /// Values of these types cannot be compared
    #[error("type error: cannot compare {left} with {right}")]
    IncomparableTypes { left: String, right: String },

    /// Column type is not recognized
    #[error("unknown column type '{0}'")]
    UnknownColumnType(String),

    // =========================================================================
    // Row errors
    // =========================================================================
    /// Row arity does not match the schema
    #[error("row has {got} values, schema has {expected} columns")]
    RowArityMismatch { expected: usize, got: usize },

    /// Row number is out of bounds
    #[error("row {row} out of bounds for table with {row_count} rows")]
    RowOutOfBounds { row: u64, row_count: u64 },

    // =========================================================================
    // Import/export errors
    // =========================================================================
    /// Malformed metadata sidecar
    #[error("invalid table metadata: {0}")]
    InvalidMetadata(String),

    /// A CSV field could not be parsed as the declared column type
    #[error("cannot parse '{field}' as {data_type} in column '{column}'")]
    CsvFieldParse {
        field: String,
        data_type: String,
        column: String,
    },

    /// CSV reader/writer failure
    #[error("CSV error: {0}")]
    Csv(String),

    /// IO error (wrapped)
    #[error("IO error: {message}")]
    Io { message: String },

    // =========================================================================
    // Other errors
    // =========================================================================
    /// A scheduled worker terminated without reporting a result
    #[error("worker terminated abnormally")]
    WorkerLost,

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new TypeMismatch error
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a new TypeConversion error
    pub fn type_conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Error::TypeConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new IncomparableTypes error
    pub fn incomparable(left: impl Into<String>, right: impl Into<String>) -> Self {
        Error::IncomparableTypes {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Create a new InvalidMetadata error
    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Error::InvalidMetadata(message.into())
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io {
            message: message.into(),
        }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a configuration error (bad operator setup or lookup)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::TableNotFound(_)
                | Error::TableAlreadyExists(_)
                | Error::ColumnNotFound(_)
                | Error::DuplicateColumn(_)
                | Error::InvalidClusterCount(_)
                | Error::TableGone
                | Error::MissingPredicateValue
                | Error::OperatorNotExecuted(_)
                | Error::OperatorAlreadyExecuted(_)
        )
    }

    /// Check if this is a type error
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Error::TypeMismatch { .. }
                | Error::TypeConversion { .. }
                | Error::IncomparableTypes { .. }
                | Error::UnknownColumnType(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::TableNotFound("orders".to_string()).to_string(),
            "table 'orders' not found"
        );
        assert_eq!(
            Error::ColumnNotFound("price".to_string()).to_string(),
            "column 'price' not found"
        );
        assert_eq!(
            Error::InvalidClusterCount(6).to_string(),
            "cluster count must be a power of two, got 6"
        );
        assert_eq!(
            Error::TableGone.to_string(),
            "statistics source table no longer exists"
        );
    }

    #[test]
    fn test_structured_error_display() {
        let err = Error::type_mismatch("INT", "TEXT");
        assert_eq!(err.to_string(), "type error: expected INT, got TEXT");

        let err = Error::RowArityMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "row has 2 values, schema has 3 columns");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::ColumnNotFound("c".to_string()).is_configuration());
        assert!(Error::InvalidClusterCount(0).is_configuration());
        assert!(Error::OperatorNotExecuted("Aggregate".to_string()).is_configuration());
        assert!(!Error::ColumnNotFound("c".to_string()).is_type_error());

        assert!(Error::type_mismatch("INT", "TEXT").is_type_error());
        assert!(Error::incomparable("TEXT", "DOUBLE").is_type_error());
        assert!(!Error::type_mismatch("INT", "TEXT").is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("file not found"));
    }
}
