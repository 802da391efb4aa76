//! Feature catalog.
//!
//! Names here are canonical (normalized) column names. The order of each list
//! is part of the feature-table contract.

/// Directly observed numeric columns.
pub const NUMERIC_FEATURES: [&str; 11] = [
    "exp_hour_total",
    "exp_hour_research",
    "exp_hour_volunteer_med",
    "exp_hour_volunteer_non_med",
    "exp_hour_employ_med",
    "exp_hour_shadowing",
    "comm_service_total_hours",
    "healthcare_total_hours",
    "num_languages",
    "parent_max_education_ordinal",
    "num_dependents",
];

/// Directly observed yes/no columns, encoded as 0/1.
pub const BINARY_FEATURES: [&str; 10] = [
    "first_generation_ind",
    "disadvantaged_ind",
    "ses_value",
    "pell_grant",
    "fee_assistance_program",
    "military_service",
    "childhood_med_underserved",
    "paid_employment_bf_18",
    "contribution_to_family",
    "employed_undergrad",
];

/// Composites derived from the observed columns.
pub const ENGINEERED_FEATURES: [&str; 7] = [
    "total_volunteer_hours",
    "community_engaged_ratio",
    "clinical_total_hours",
    "direct_care_ratio",
    "adversity_count",
    "grit_index",
    "experience_diversity",
];

/// Experience-type indicators derived from the experiences file.
pub const EXPERIENCE_FLAGS: [&str; 9] = [
    "has_direct_patient_care",
    "has_volunteering",
    "has_community_service",
    "has_shadowing",
    "has_clinical_experience",
    "has_leadership",
    "has_research",
    "has_military_service",
    "has_honors",
];

/// Columns encoded with a learned category table.
pub const CATEGORICAL_FEATURES: [&str; 1] = ["gpa_trend"];

/// Personal statement rubric dimensions.
pub const PERSONAL_STATEMENT_DIMENSIONS: [&str; 7] = [
    "writing_quality",
    "authenticity_and_self_awareness",
    "mission_alignment_service_orientation",
    "adversity_resilience",
    "motivation_depth",
    "intellectual_curiosity",
    "maturity_and_reflection",
];

/// Experience quality rubric dimensions.
pub const EXPERIENCE_QUALITY_DIMENSIONS: [&str; 9] = [
    "direct_patient_care_depth_and_quality",
    "research_depth_and_quality",
    "community_service_depth_and_quality",
    "leadership_depth_and_quality",
    "teaching_mentoring_depth_and_quality",
    "clinical_exposure_depth_and_quality",
    "clinical_employment_depth_and_quality",
    "advocacy_policy_depth_and_quality",
    "global_crosscultural_depth_and_quality",
];

/// Secondary application rubric dimensions.
pub const SECONDARY_DIMENSIONS: [&str; 5] = [
    "personal_attributes_insight",
    "adversity_response_quality",
    "reflection_depth",
    "healthcare_experience_quality",
    "research_depth",
];

/// Marks whether any rubric score was available for the applicant.
pub const RUBRIC_SCORED_FLAG: &str = "rubric_scored_flag";

/// Demographic fields that must never be model inputs.
pub const PROTECTED_ATTRIBUTES: [&str; 4] = ["gender", "age", "race", "citizenship"];

/// Family of a feature, which decides how it is tested for drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureFamily {
    Numeric,
    Binary,
    Engineered,
    ExperienceFlag,
    Categorical,
    Rubric,
}

/// All rubric dimensions in contract order.
pub fn rubric_dimensions() -> impl Iterator<Item = &'static str> {
    PERSONAL_STATEMENT_DIMENSIONS
        .iter()
        .chain(EXPERIENCE_QUALITY_DIMENSIONS.iter())
        .chain(SECONDARY_DIMENSIONS.iter())
        .copied()
}

pub fn is_protected(column: &str) -> bool {
    PROTECTED_ATTRIBUTES
        .iter()
        .any(|protected| protected.eq_ignore_ascii_case(column))
}

/// Family of a known feature name.
pub fn feature_family(name: &str) -> Option<FeatureFamily> {
    let name = name.trim().to_lowercase();
    let name = name.as_str();
    if NUMERIC_FEATURES.contains(&name) {
        Some(FeatureFamily::Numeric)
    } else if BINARY_FEATURES.contains(&name) {
        Some(FeatureFamily::Binary)
    } else if ENGINEERED_FEATURES.contains(&name) {
        Some(FeatureFamily::Engineered)
    } else if EXPERIENCE_FLAGS.contains(&name) {
        Some(FeatureFamily::ExperienceFlag)
    } else if CATEGORICAL_FEATURES.contains(&name) {
        Some(FeatureFamily::Categorical)
    } else if name == RUBRIC_SCORED_FLAG || rubric_dimensions().any(|dim| dim == name) {
        Some(FeatureFamily::Rubric)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rubric_dimension_count() {
        assert_eq!(rubric_dimensions().count(), 21);
    }

    #[test]
    fn families_do_not_overlap_protected_fields() {
        for protected in PROTECTED_ATTRIBUTES {
            assert_eq!(feature_family(protected), None);
        }
        assert_eq!(feature_family("Grit_Index"), Some(FeatureFamily::Engineered));
        assert_eq!(feature_family("gpa_trend"), Some(FeatureFamily::Categorical));
    }
}
