use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// How rows of a file relate to applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly one row per applicant; the join key is unique.
    OnePerApplicant,
    /// Any number of rows per applicant.
    OneToMany,
}

/// Recognized export categories of an admissions cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Applicants,
    Experiences,
    PersonalStatement,
    SecondaryApplication,
    GpaTrend,
    Languages,
    Parents,
    AcademicRecords,
    Military,
    Siblings,
}

impl FileType {
    pub const ALL: [FileType; 10] = [
        FileType::Applicants,
        FileType::Experiences,
        FileType::PersonalStatement,
        FileType::SecondaryApplication,
        FileType::GpaTrend,
        FileType::Languages,
        FileType::Parents,
        FileType::AcademicRecords,
        FileType::Military,
        FileType::Siblings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applicants => "applicants",
            Self::Experiences => "experiences",
            Self::PersonalStatement => "personal_statement",
            Self::SecondaryApplication => "secondary_application",
            Self::GpaTrend => "gpa_trend",
            Self::Languages => "languages",
            Self::Parents => "parents",
            Self::AcademicRecords => "academic_records",
            Self::Military => "military",
            Self::Siblings => "siblings",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applicants => "Applicants",
            Self::Experiences => "Experiences",
            Self::PersonalStatement => "Personal Statement",
            Self::SecondaryApplication => "Secondary Application",
            Self::GpaTrend => "GPA Trend",
            Self::Languages => "Languages",
            Self::Parents => "Parents",
            Self::AcademicRecords => "Academic Records",
            Self::Military => "Military",
            Self::Siblings => "Siblings",
        }
    }

    /// Parse a file type from its identifier. Accepts a few common spellings.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        match key.trim_matches('_') {
            "applicants" | "applicant" => Some(Self::Applicants),
            "experiences" | "experience" => Some(Self::Experiences),
            "personal_statement" | "personal_statements" => Some(Self::PersonalStatement),
            "secondary_application" | "secondary" => Some(Self::SecondaryApplication),
            "gpa_trend" | "gpa_trends" => Some(Self::GpaTrend),
            "languages" | "language" => Some(Self::Languages),
            "parents" | "parent" => Some(Self::Parents),
            "academic_records" | "academic_record" => Some(Self::AcademicRecords),
            "military" => Some(Self::Military),
            "siblings" | "sibling" => Some(Self::Siblings),
            _ => None,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::Applicants
            | Self::PersonalStatement
            | Self::SecondaryApplication
            | Self::GpaTrend => Cardinality::OnePerApplicant,
            Self::Experiences
            | Self::Languages
            | Self::Parents
            | Self::AcademicRecords
            | Self::Military
            | Self::Siblings => Cardinality::OneToMany,
        }
    }

    /// The primary file defines the authoritative applicant set.
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Applicants)
    }

    /// Required files must be present in every cycle.
    pub fn is_required(&self) -> bool {
        !matches!(
            self,
            Self::AcademicRecords | Self::Military | Self::Siblings
        )
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ModelError::UnknownFileType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_identifiers() {
        for file_type in FileType::ALL {
            assert_eq!(FileType::parse(file_type.as_str()), Some(file_type));
        }
        assert_eq!(FileType::parse("GPA Trend"), Some(FileType::GpaTrend));
        assert_eq!(FileType::parse("unknown"), None);
    }

    #[test]
    fn only_applicants_is_primary() {
        let primary: Vec<_> = FileType::ALL.iter().filter(|t| t.is_primary()).collect();
        assert_eq!(primary, vec![&FileType::Applicants]);
    }
}
