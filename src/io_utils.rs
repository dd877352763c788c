//! I/O helpers for opening, tokenizing and decoding the backing file.
//!
//! The backing file is opened for shared reading so that writers (and on
//! Windows, deleters) are never locked out while a pass is in flight.
//! Tokenizing is delegated to the `csv` crate; only the delimiter is
//! configurable.

use std::{
    fs::{File, OpenOptions},
    io::Read,
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};

use crate::error::{Result, SourceError};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[cfg(windows)]
const FILE_SHARE_ALL: u32 = 0x1 | 0x2 | 0x4;

pub fn open_shared(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        options.share_mode(FILE_SHARE_ALL);
    }
    Ok(options.open(path)?)
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Encoding::for_label(value.as_bytes())
            .ok_or_else(|| SourceError::UnknownEncoding(value.to_string())),
        None => Ok(UTF_8),
    }
}

/// Accepts a single ASCII character or one of the named aliases; empty text
/// selects the comma default.
pub fn parse_delimiter(value: &str) -> Result<u8> {
    match value {
        "" | "comma" | "," => Ok(DEFAULT_CSV_DELIMITER),
        "tab" | "\t" | "\\t" => Ok(DEFAULT_TSV_DELIMITER),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(first), None) if first.is_ascii() && first != '"' && first != '\n' => {
                    Ok(first as u8)
                }
                _ => Err(SourceError::InvalidDelimiter(other.to_string())),
            }
        }
    }
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

/// Decodes each field with exactly the configured encoding. Byte order marks
/// are not sniffed per field; the csv reader already drops a leading UTF-8 BOM
/// from the stream.
pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
    row: usize,
) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            encoding
                .decode_without_bom_handling_and_without_replacement(field)
                .map(|text| text.into_owned())
                .ok_or(SourceError::Decode { row })
        })
        .collect()
}
