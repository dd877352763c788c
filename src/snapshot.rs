//! Record reading and snapshot assembly.
//!
//! One pass reads the header line, parses it into a [`HeaderInfo`], then
//! coerces every following record field-by-field. Rows are identified by
//! their 0-based position within the pass. The first coercion failure
//! abandons the whole pass, so a partially built snapshot is never returned.

use std::{io::Read, path::Path};

use encoding_rs::Encoding;
use log::debug;
use serde::Serialize;

use crate::{
    config::SourceConfig,
    data::{Cell, coerce},
    error::{Result, SourceError},
    io_utils,
    schema::{ColumnSpec, HeaderInfo, parse_header},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub identity: String,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(ordinal: usize, cells: Vec<Cell>) -> Self {
        Self {
            identity: ordinal.to_string(),
            cells,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub header: HeaderInfo,
    pub rows: Vec<Row>,
}

impl Snapshot {
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.header.columns
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, identity: &str) -> Option<&Row> {
        identity
            .parse::<usize>()
            .ok()
            .and_then(|ordinal| self.rows.get(ordinal))
    }
}

pub fn read_snapshot(config: &SourceConfig) -> Result<Snapshot> {
    let snapshot = read_snapshot_from_path(&config.path, config.delimiter, config.encoding)?;
    debug!(
        "Read {} row(s) across {} column(s) from {:?}",
        snapshot.count(),
        snapshot.header.column_count(),
        config.path
    );
    Ok(snapshot)
}

pub fn read_snapshot_from_path(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Snapshot> {
    let file = io_utils::open_shared(path)?;
    build_snapshot(std::io::BufReader::new(file), delimiter, encoding)
}

pub fn build_snapshot<R: Read>(
    source: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Snapshot> {
    let mut reader = io_utils::open_csv_reader(source, delimiter);
    let header_record = reader.byte_headers()?.clone();
    if header_record.is_empty() {
        return Err(SourceError::MissingHeader);
    }
    let header_cells = io_utils::decode_record(&header_record, encoding, 1)?;
    let header = parse_header(&header_cells)?;

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let ordinal = rows.len();
        // Line numbers in errors are 1-based and count the header.
        let line = ordinal + 2;
        let fields = io_utils::decode_record(&record, encoding, line)?;
        let cells = header
            .column_types()
            .zip(fields.iter())
            .enumerate()
            .map(|(column, (target, raw))| coerce(raw, column, target))
            .collect::<Result<Vec<_>>>()
            .map_err(|error| SourceError::Record {
                row: line,
                error: Box::new(error),
            })?;
        rows.push(Row::new(ordinal, cells));
    }
    Ok(Snapshot { header, rows })
}
