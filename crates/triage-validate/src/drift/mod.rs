//! Distribution drift detection.

mod detector;
mod prevalence;
pub mod stats;

pub use detector::{
    DistributionSummary, DriftFeature, DriftKind, DriftReport, DriftTest, FeatureDrift,
    SkippedFeature, aggregate_severity, detect_drift, is_drifted,
};
pub use prevalence::{PrevalencePattern, PrevalenceShift, check_prevalence, positive_rate};
