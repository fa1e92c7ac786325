//! Error taxonomy. Each step wraps driver/library errors into one of
//! these categories; raw driver errors never escape a step boundary.

use crate::model::ident::QualifiedName;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("unsupported Oracle type: {0}")]
    UnsupportedOracleType(String),
    #[error("unknown composite type: {0}")]
    UnknownCompositeType(QualifiedName),
}

#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("dependency cycle among: {}", .members.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(", "))]
    Cycle { members: Vec<QualifiedName> },
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("parse error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unsupported construct `{construct}`: {explanation}")]
    UnsupportedConstruct {
        construct: String,
        explanation: String,
    },
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("row count mismatch for {table}: source had {source_count}, target has {target_count}")]
    RowCountMismatch {
        table: QualifiedName,
        source_count: u64,
        target_count: u64,
    },
    #[error("failed to serialize row {row_index} of {table}: {message}")]
    SerializationFailure {
        table: QualifiedName,
        row_index: u64,
        message: String,
    },
    #[error("transfer of {table} aborted mid-flight; target table was truncated and is now empty")]
    PartialTransfer { table: QualifiedName },
}

/// The top-level error every migration step returns. Carries the qualified
/// name of the failing object and a category tag so callers can render a
/// useful message without matching on error internals.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("connectivity error after retry: {0}")]
    Connectivity(#[source] anyhow::Error),

    #[error("metadata extraction error for {object}: {message}")]
    Metadata {
        object: QualifiedName,
        message: String,
    },

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error(transparent)]
    Transformation(#[from] TransformError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, MigrationError>;
