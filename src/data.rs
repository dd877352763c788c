use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::{
    error::{Result, SourceError},
    schema::ColumnType,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Double(f64),
    Integer(i64),
    String(String),
}

impl Cell {
    pub fn as_display(&self) -> String {
        match self {
            Cell::Boolean(b) => b.to_string(),
            Cell::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
            Cell::Double(f) => f.to_string(),
            Cell::Integer(i) => i.to_string(),
            Cell::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

const DATETIME_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%m/%d/%Y %H:%M:%S %:z",
];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d %B %Y", "%d %b %Y"];

/// Parses culture-invariant date/time text (month before day) and tags the
/// wall-clock value as UTC. Offsets are dropped, not applied.
pub fn parse_utc_datetime(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    naive_wall_clock(trimmed)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SourceError::DateTimeFormat {
            raw: value.to_string(),
        })
}

fn naive_wall_clock(value: &str) -> Option<NaiveDateTime> {
    if let Some(rest) = value.strip_suffix('Z') {
        return naive_wall_clock(rest);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATETIME_OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, fmt) {
            return Some(parsed.naive_local());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn parse_boolean(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Converts one raw field to the column's declared type. `column` is only
/// used to describe a failure.
pub fn coerce(raw: &str, column: usize, target: ColumnType) -> Result<Cell> {
    let conversion_error = || SourceError::TypeConversion {
        raw: raw.to_string(),
        column,
        target,
    };
    let cell = match target {
        ColumnType::String => Cell::String(raw.to_string()),
        ColumnType::Boolean => Cell::Boolean(parse_boolean(raw).ok_or_else(conversion_error)?),
        ColumnType::Integer => {
            Cell::Integer(raw.trim().parse().map_err(|_| conversion_error())?)
        }
        ColumnType::Double => Cell::Double(raw.trim().parse().map_err(|_| conversion_error())?),
        ColumnType::DateTime => Cell::DateTime(parse_utc_datetime(raw)?),
    };
    Ok(cell)
}
