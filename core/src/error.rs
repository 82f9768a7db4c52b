use thiserror::Error;

use crate::value::DataType;

/// Errors raised while turning a raw SQL line into a [`crate::sql::Statement`].
#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unsupported statement: {0}")]
    Unsupported(String),
}

/// Errors raised while executing a parsed statement against a [`crate::Database`].
#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("table `{0}` does not exist")]
    UnknownTable(String),
    #[error("column `{0}` does not exist")]
    UnknownColumn(String),
    #[error("`{0}` already exists")]
    AlreadyExists(String),
    #[error("expected {expected} value(s), found {found}")]
    Arity { expected: usize, found: usize },
    #[error("column `{column}` expects {expected:?}, found {found:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        found: DataType,
    },
    #[error("column `{0}` does not allow NULL")]
    NullViolation(String),
    #[error("duplicate value for unique column `{0}`")]
    UniqueViolation(String),
}

/// Errors raised while encoding or decoding a whole-database snapshot.
#[derive(Error, Debug, PartialEq)]
pub enum SnapshotError {
    #[error("not a pesadb snapshot file")]
    BadMagic,
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u16),
    #[error("malformed snapshot: {0}")]
    FormatError(String),
    #[error("io error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::IoError(err.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for SnapshotError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        SnapshotError::FormatError(err.to_string())
    }
}

/// The top-level error type, wrapping every layer so callers can use `?`
/// across parse/execute/snapshot boundaries without manual conversions.
#[derive(Error, Debug, PartialEq)]
pub enum DbError {
    #[error("ParseError: {0}")]
    Parse(#[from] ParseError),
    #[error("EngineError: {0}")]
    Engine(#[from] EngineError),
    #[error("SnapshotError: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Result alias for `#[test] fn test_<behavior>() -> TestResult` bodies,
/// letting tests propagate engine errors with `?` instead of `.unwrap()`.
#[cfg(test)]
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;
