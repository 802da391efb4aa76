//! Admissions export ingestion.
//!
//! This crate discovers export files, classifies them by file type, and loads
//! each one into a polars `DataFrame` exactly once.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use triage_ingest::load_directory;
//!
//! let loaded = load_directory(Path::new("exports/2025"))?;
//! for table in &loaded.tables {
//!     println!("{}: {} rows", table.file_type(), table.height());
//! }
//! ```

mod detection;
mod discovery;
mod error;
pub mod polars_utils;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Tables ===
pub use table::{RawTable, read_frame, read_raw_table};

// === File Discovery ===
pub use detection::{detect_file_type, detect_from_columns, detect_from_filename};
pub use discovery::{
    DiscoveredFile, LoadedDirectory, discover_files, list_csv_files, load_directory,
};

// === Value Helpers ===
pub use polars_utils::{
    any_to_f64, any_to_string, any_to_string_non_empty, canonical_key, column_keys,
    column_numbers, column_strings, format_numeric, is_null_value, null_count, parse_f64,
};
