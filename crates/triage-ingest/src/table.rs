//! Raw export tables.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use triage_model::{FileType, HeaderLookup};

use crate::error::{IngestError, Result};

/// One export file as loaded: ordered raw headers and heterogeneous cells.
///
/// A `RawTable` is built once per file and never mutated afterwards. Every
/// downstream consumer (preview, counts, checks) reads the same frame.
#[derive(Debug, Clone)]
pub struct RawTable {
    file_type: FileType,
    source: Option<PathBuf>,
    data: DataFrame,
}

impl RawTable {
    pub fn new(file_type: FileType, data: DataFrame) -> Self {
        Self {
            file_type,
            source: None,
            data,
        }
    }

    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Raw headers in file order.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    /// First `rows` rows of the already-loaded frame.
    pub fn preview(&self, rows: usize) -> DataFrame {
        self.data.head(Some(rows))
    }

    pub fn header_lookup(&self) -> HeaderLookup {
        HeaderLookup::new(self.columns())
    }
}

/// Read a CSV file into a frame with a single pass over the file.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    // Scan every row so a late text value widens the column instead of failing.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    for name in df.get_column_names() {
        if name.trim().is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
            });
        }
    }
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read export file"
    );
    Ok(df)
}

/// Read a CSV file as a table of a known file type.
pub fn read_raw_table(path: &Path, file_type: FileType) -> Result<RawTable> {
    let df = read_frame(path)?;
    Ok(RawTable::new(file_type, df).with_source(path))
}
