//! Orchestration of an admissions triage cycle.
//!
//! ```ignore
//! let config = TriageConfig::default_config()?;
//! let cycle = load_cycle(Path::new("exports/2025"))?;
//! let validation = validate_cycle(&cycle.tables, None, &config)?;
//! if validation.can_proceed() {
//!     let store = PipelineStore::from_config(&config.store);
//!     let outcome = score(&cycle.tables, RunOptions::new("2024.1"), &store, &config)?;
//! }
//! ```

mod cycle;
mod error;
mod reference;
mod training;
mod validation;

pub use cycle::{canonical_frames, load_cycle, required_file_messages};
pub use error::{CoreError, Result};
pub use reference::{ReferenceBaseline, build_reference};
pub use training::{FeatureOutput, RunOptions, RunOutcome, score, train};
pub use validation::{CycleValidation, drift_features, validate_cycle};
