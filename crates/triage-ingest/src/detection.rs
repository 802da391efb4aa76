//! File-type detection from file names and column signatures.

use std::path::Path;

use triage_model::{FileType, HeaderLookup, normalize_header};

/// Columns that identify a file type when the file name does not.
/// Checked in order; the first match wins.
const COLUMN_SIGNATURES: [(FileType, &[&str]); 10] = [
    (
        FileType::Applicants,
        &["application_review_score", "exp_hour_total", "first_generation_ind"],
    ),
    (FileType::Experiences, &["exp_type", "exp_name"]),
    (FileType::GpaTrend, &["total_gpa_trend", "gpa_trend"]),
    (FileType::Languages, &["language_desc", "language"]),
    (FileType::Parents, &["edu_level", "parent_education_level"]),
    (FileType::PersonalStatement, &["personal_statement"]),
    (
        FileType::SecondaryApplication,
        &["1_personal_attributes", "employed_undergrad"],
    ),
    (FileType::Military, &["military_service_status"]),
    (FileType::Siblings, &["sibling", "sibling_age"]),
    (FileType::AcademicRecords, &["gpa", "credit_hours", "course_title"]),
];

/// Detect a file type from the file name.
///
/// Accepts AMCAS export names such as `"6. Experiences.csv"` as well as plain
/// identifiers such as `experiences.csv`.
pub fn detect_from_filename(path: &Path) -> Option<FileType> {
    let stem = path.file_stem()?.to_str()?;
    let normalized = normalize_header(stem);
    // Drop a leading export number ("6_experiences" -> "experiences").
    let name = match normalized.split_once('_') {
        Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => normalized.as_str(),
    };
    FileType::parse(name)
}

/// Detect a file type from its headers.
pub fn detect_from_columns<S: AsRef<str>>(headers: &[S]) -> Option<FileType> {
    let lookup = HeaderLookup::new(headers.iter().map(AsRef::as_ref));
    COLUMN_SIGNATURES
        .iter()
        .find(|(_, signatures)| signatures.iter().any(|column| lookup.contains(column)))
        .map(|(file_type, _)| *file_type)
}

/// Detect a file type, preferring the file name over the column signature.
pub fn detect_file_type<S: AsRef<str>>(path: &Path, headers: &[S]) -> Option<FileType> {
    detect_from_filename(path).or_else(|| detect_from_columns(headers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_numbered_export_names() {
        assert_eq!(
            detect_from_filename(Path::new("1. Applicants.csv")),
            Some(FileType::Applicants)
        );
        assert_eq!(
            detect_from_filename(Path::new("12. GPA Trend.csv")),
            Some(FileType::GpaTrend)
        );
        assert_eq!(
            detect_from_filename(Path::new("2. Language.csv")),
            Some(FileType::Languages)
        );
        assert_eq!(detect_from_filename(Path::new("notes.csv")), None);
    }

    #[test]
    fn detects_from_signature_columns() {
        assert_eq!(
            detect_from_columns(&["Amcas_ID", "Exp_Type", "Exp_Name"]),
            Some(FileType::Experiences)
        );
        assert_eq!(
            detect_from_columns(&["AMCAS ID", "1 - Personal Attributes"]),
            Some(FileType::SecondaryApplication)
        );
        assert_eq!(detect_from_columns(&["foo", "bar"]), None);
    }

    #[test]
    fn filename_wins_over_columns() {
        assert_eq!(
            detect_file_type(Path::new("parents.csv"), &["exp_type"]),
            Some(FileType::Parents)
        );
    }
}
