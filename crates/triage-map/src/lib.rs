//! Column reconciliation.
//!
//! Resolves the raw, cycle-specific headers of an export file against the
//! canonical targets registered for its file type.

mod error;
mod frame;
mod reconcile;

pub use error::{MapError, Result};
pub use frame::canonical_frame;
pub use reconcile::{ColumnReconciler, FeatureCoverage, Reconciliation, header_similarity};
