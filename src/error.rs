//! Error taxonomy for the data source.
//!
//! Configuration errors are raised when a [`SourceConfig`](crate::config::SourceConfig)
//! is accepted, schema and coercion errors abort a single read pass, and the
//! transparent I/O/csv/watch wrappers cover the collaborators underneath.

use std::path::PathBuf;

use thiserror::Error;

use crate::{schema::ColumnType, source::SourceState};

pub type Result<T, E = SourceError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No input file path was provided")]
    EmptyPath,
    #[error("Input file {0:?} does not exist")]
    MissingFile(PathBuf),
    #[error("Invalid delimiter '{0}': expected a single ASCII character")]
    InvalidDelimiter(String),
    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),
    #[error("Input file has no header line")]
    MissingHeader,
    #[error("Columns {first} and {second} are both declared as '::key'; only one key column is allowed")]
    DuplicateKey { first: usize, second: usize },
    #[error("Failed to convert '{raw}' in column {column} to {target}")]
    TypeConversion {
        raw: String,
        column: usize,
        target: ColumnType,
    },
    #[error("Failed to parse '{raw}' as datetime")]
    DateTimeFormat { raw: String },
    #[error("Failed to decode line {row} with the configured encoding")]
    Decode { row: usize },
    #[error("Line {row}: {error}")]
    Record { row: usize, error: Box<SourceError> },
    #[error("Column set changed on reload; expected [{expected}], found [{found}]")]
    SchemaChanged { expected: String, found: String },
    #[error("Cannot {operation} while the source is {state}")]
    InvalidState {
        operation: &'static str,
        state: SourceState,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Watch(#[from] notify::Error),
}

impl SourceError {
    /// Strips positional `Record` wrappers down to the coercion error underneath.
    pub fn root_cause(&self) -> &SourceError {
        match self {
            SourceError::Record { error, .. } => error.root_cause(),
            other => other,
        }
    }

    /// Errors a half-written or briefly locked file produces; the next change
    /// notification is expected to succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Io(_)
            | SourceError::Csv(_)
            | SourceError::Decode { .. }
            | SourceError::MissingHeader => true,
            SourceError::Record { error, .. } => error.is_transient(),
            _ => false,
        }
    }
}
