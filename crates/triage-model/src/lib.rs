//! Shared data model for the admissions triage pipeline.

pub mod error;
pub mod file_type;
pub mod lookup;
pub mod mapping;
pub mod message;
pub mod result;

pub use error::{ModelError, Result};
pub use file_type::{Cardinality, FileType};
pub use lookup::{HeaderLookup, normalize_header};
pub use mapping::{ColumnMatch, MatchMethod};
pub use message::{Category, Severity, ValidationMessage};
pub use result::{DataMode, FileCheckResult, RunStatus, ValidationResult};
