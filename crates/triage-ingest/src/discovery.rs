//! File discovery and file-type classification.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use triage_model::FileType;

use crate::detection::{detect_file_type, detect_from_filename};
use crate::error::{IngestError, Result};
use crate::table::{RawTable, read_frame};

/// A discovered CSV file with its file-type classification from the name.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub file_type: Option<FileType>,
}

/// Tables loaded from one export directory.
#[derive(Debug, Default)]
pub struct LoadedDirectory {
    pub tables: Vec<RawTable>,
    /// Files whose type could be determined neither by name nor by columns.
    pub unrecognized: Vec<PathBuf>,
}

impl LoadedDirectory {
    pub fn file_types(&self) -> Vec<FileType> {
        self.tables.iter().map(RawTable::file_type).collect()
    }

    pub fn table(&self, file_type: FileType) -> Option<&RawTable> {
        self.tables.iter().find(|table| table.file_type() == file_type)
    }
}

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Classifies CSV files by name only, without reading them.
pub fn discover_files(dir: &Path) -> Result<Vec<DiscoveredFile>> {
    Ok(list_csv_files(dir)?
        .into_iter()
        .map(|path| {
            let file_type = detect_from_filename(&path);
            DiscoveredFile { path, file_type }
        })
        .collect())
}

/// Reads every CSV file in a directory exactly once and classifies it.
///
/// Files without a recognizable name are classified by their headers, using
/// the frame already read. Two files of the same type are an error.
pub fn load_directory(dir: &Path) -> Result<LoadedDirectory> {
    let mut loaded = LoadedDirectory::default();
    let mut seen: BTreeMap<FileType, PathBuf> = BTreeMap::new();

    for path in list_csv_files(dir)? {
        let df = read_frame(&path)?;
        let headers: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let Some(file_type) = detect_file_type(&path, &headers) else {
            warn!(path = %path.display(), "unrecognized export file");
            loaded.unrecognized.push(path);
            continue;
        };
        if let Some(first) = seen.get(&file_type) {
            return Err(IngestError::DuplicateFileType {
                file_type,
                first: first.clone(),
                second: path,
            });
        }
        info!(
            file_type = %file_type,
            rows = df.height(),
            columns = df.width(),
            "loaded export file"
        );
        seen.insert(file_type, path.clone());
        loaded
            .tables
            .push(RawTable::new(file_type, df).with_source(path));
    }
    Ok(loaded)
}
