//! Applicant-level feature engineering.
//!
//! - [`assemble`]: joins the canonical per-file frames into an
//!   [`ApplicantDataset`] with one record per primary applicant.
//! - [`FeaturePipeline`]: fit on a training cohort, transform any cohort.
//! - [`PipelineStore`]: versioned persistence of the fitted state.
//! - [`RubricScores`]: essay rubric scores joined in at transform time.

mod assemble;
mod dataset;
mod error;
mod pipeline;
mod rubric;
mod store;
mod table;

pub use assemble::{AssembleOptions, assemble, education_ordinal, parse_binary};
pub use dataset::{ApplicantDataset, ApplicantRecord, ID_COLUMN};
pub use error::{FeatureError, Result};
pub use pipeline::{FeaturePipeline, FittedFeaturePipeline, UNSCORED_RUBRIC, UNSEEN_CATEGORY};
pub use rubric::RubricScores;
pub use store::{PipelineStore, STORE_SCHEMA_VERSION, StoredPipeline};
pub use table::FeatureTable;
