use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use encoding_rs::{Encoding, UTF_8};

use crate::{
    error::{Result, SourceError},
    io_utils,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
/// Shortest window the debouncer is given; its tick runs at a quarter of it.
pub const MIN_DEBOUNCE: Duration = Duration::from_millis(10);

/// Accepted input configuration. Construction validates the path and
/// delimiter, so a `SourceConfig` always points at an existing file.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub debounce: Duration,
}

impl SourceConfig {
    pub fn new(path: impl AsRef<Path>, delimiter: &str) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SourceError::EmptyPath);
        }
        if !path.is_file() {
            return Err(SourceError::MissingFile(path.to_path_buf()));
        }
        // Watch events are reported against the canonical parent directory.
        let path = path
            .canonicalize()
            .map_err(|_| SourceError::MissingFile(path.to_path_buf()))?;
        Ok(Self {
            path,
            delimiter: io_utils::parse_delimiter(delimiter)?,
            encoding: UTF_8,
            debounce: DEFAULT_DEBOUNCE,
        })
    }

    pub fn with_encoding(mut self, label: Option<&str>) -> Result<Self> {
        self.encoding = io_utils::resolve_encoding(label)?;
        Ok(self)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce.max(MIN_DEBOUNCE);
        self
    }
}
