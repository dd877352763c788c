//! Column schema model and the annotated header parser.
//!
//! A header cell is either a bare column name (`Name`) or a name followed by
//! a `::` type annotation (`Count::int`). The annotation tokens are matched
//! case-sensitively:
//!
//! | token      | column type |
//! |------------|-------------|
//! | `bool`     | Boolean     |
//! | `datetime` | DateTime    |
//! | `double`   | Double      |
//! | `int`      | Integer     |
//! | `key`      | String, and marks the key column |
//!
//! Any other token silently falls back to String.

use std::fmt;

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::error::{Result, SourceError};

pub const TYPE_SEPARATOR: &str = "::";
pub const KEY_TOKEN: &str = "key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    Boolean,
    DateTime,
    Double,
    Integer,
    String,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "Boolean",
            ColumnType::DateTime => "DateTime",
            ColumnType::Double => "Double",
            ColumnType::Integer => "Integer",
            ColumnType::String => "String",
        }
    }

    /// Maps a header annotation to a column type. `key` and unknown tokens
    /// return `None`; both are String columns.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "bool" => Some(ColumnType::Boolean),
            "datetime" => Some(ColumnType::DateTime),
            "double" => Some(ColumnType::Double),
            "int" => Some(ColumnType::Integer),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    /// Index of the single `::key` column. Parsed and reported, but row
    /// identity stays positional.
    pub key_column_index: Option<usize>,
    pub columns: Vec<ColumnSpec>,
}

impl HeaderInfo {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_types(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.columns.iter().map(|column| column.column_type)
    }

    pub fn same_columns(&self, other: &HeaderInfo) -> bool {
        self.columns == other.columns
    }

    /// One-line `name:Type` summary used in logs and schema-change errors.
    pub fn describe(&self) -> String {
        self.columns
            .iter()
            .map(|column| format!("{}:{}", column.name, column.column_type))
            .join(", ")
    }
}

pub fn parse_header<S: AsRef<str>>(cells: &[S]) -> Result<HeaderInfo> {
    let mut header = HeaderInfo::default();
    for (idx, cell) in cells.iter().enumerate() {
        let cell = cell.as_ref();
        let (name, column_type) = match cell.split_once(TYPE_SEPARATOR) {
            None => (cell, ColumnType::String),
            Some((name, KEY_TOKEN)) => {
                if let Some(first) = header.key_column_index {
                    return Err(SourceError::DuplicateKey { first, second: idx });
                }
                header.key_column_index = Some(idx);
                (name, ColumnType::String)
            }
            Some((name, token)) => {
                let column_type = ColumnType::from_token(token).unwrap_or_else(|| {
                    debug!("Unrecognized type '{token}' on column '{name}'; using String");
                    ColumnType::String
                });
                (name, column_type)
            }
        };
        header.columns.push(ColumnSpec::new(name, column_type));
    }
    Ok(header)
}
