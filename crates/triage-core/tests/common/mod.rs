//! A small but complete admissions cycle built in memory.

#![allow(dead_code)]

use polars::prelude::*;

use triage_ingest::RawTable;
use triage_model::FileType;
use triage_standards::TriageConfig;

pub const HOURS: [&str; 8] = [
    "exp_hour_total",
    "exp_hour_research",
    "exp_hour_volunteer_med",
    "exp_hour_volunteer_non_med",
    "exp_hour_employ_med",
    "exp_hour_shadowing",
    "comm_service_total_hours",
    "healthcare_total_hours",
];

const INDICATORS: [&str; 9] = [
    "first_generation_ind",
    "disadvantaged_ind",
    "ses_value",
    "pell_grant",
    "fee_assistance_program",
    "military_service",
    "childhood_med_underserved",
    "paid_employment_bf_18",
    "contribution_to_family",
];

const EXPERIENCE_TYPES: [&str; 5] = [
    "Research/Lab",
    "Physician Shadowing/Clinical Observation",
    "Community Service/Volunteer - Medical/Clinical",
    "Leadership - Not Listed Elsewhere",
    "Paid Employment - Medical/Clinical",
];

const EDUCATION: [&str; 3] = ["Bachelor's Degree", "High School Diploma", "Doctorate"];

pub const APPLICANTS: usize = 150;

/// How the generated cycle should look.
#[derive(Debug, Clone, Copy)]
pub struct CycleShape {
    pub labelled: bool,
    /// Added to every hours value.
    pub hours_offset: f64,
}

impl Default for CycleShape {
    fn default() -> Self {
        Self {
            labelled: true,
            hours_offset: 0.0,
        }
    }
}

pub fn config() -> TriageConfig {
    TriageConfig::default_config().expect("built-in config")
}

pub fn id(index: usize) -> String {
    format!("{}", 10_000 + index)
}

fn ids(rows: usize) -> Vec<String> {
    (0..rows).map(id).collect()
}

fn frame(columns: Vec<Column>) -> DataFrame {
    DataFrame::new(columns).expect("dataframe")
}

pub fn applicants(shape: CycleShape) -> RawTable {
    let rows = APPLICANTS;
    let mut columns = vec![Column::new("AMCAS ID".into(), ids(rows))];
    if shape.labelled {
        let scores: Vec<i64> = (0..rows).map(|i| 10 + (i % 16) as i64).collect();
        columns.push(Column::new("Application Review Score".into(), scores));
    }
    for (offset, name) in HOURS.iter().enumerate() {
        let values: Vec<f64> = (0..rows)
            .map(|i| ((i + offset * 7) % 400) as f64 + shape.hours_offset)
            .collect();
        columns.push(Column::new((*name).into(), values));
    }
    let dependents: Vec<i64> = (0..rows).map(|i| (i % 3) as i64).collect();
    columns.push(Column::new("num_dependents".into(), dependents));
    for name in INDICATORS {
        let values: Vec<&str> = (0..rows)
            .map(|i| if i % 4 == 0 { "Yes" } else { "No" })
            .collect();
        columns.push(Column::new(name.into(), values));
    }
    let ages: Vec<i64> = (0..rows).map(|i| 21 + (i % 15) as i64).collect();
    columns.push(Column::new("Age".into(), ages));
    RawTable::new(FileType::Applicants, frame(columns))
}

pub fn experiences() -> RawTable {
    let per_applicant = EXPERIENCE_TYPES.len();
    let mut keys = Vec::new();
    let mut types = Vec::new();
    let mut names = Vec::new();
    let mut descriptions = Vec::new();
    let mut hours = Vec::new();
    for applicant in 0..APPLICANTS {
        for (slot, exp_type) in EXPERIENCE_TYPES.iter().enumerate() {
            keys.push(id(applicant));
            types.push(*exp_type);
            names.push(format!("Activity {applicant}-{slot}"));
            descriptions.push(format!("Worked on project {slot}"));
            hours.push(((applicant + slot * 11) % 300) as f64);
        }
    }
    assert_eq!(keys.len(), APPLICANTS * per_applicant);
    RawTable::new(
        FileType::Experiences,
        frame(vec![
            Column::new("amcas_id".into(), keys),
            Column::new("Exp_Type".into(), types),
            Column::new("Exp_Name".into(), names),
            Column::new("Exp_Desc".into(), descriptions),
            Column::new("Total_Hours".into(), hours),
        ]),
    )
}

fn one_per_applicant(file_type: FileType, name: &str, values: Vec<String>) -> RawTable {
    RawTable::new(
        file_type,
        frame(vec![
            Column::new("amcas_id".into(), ids(APPLICANTS)),
            Column::new(name.into(), values),
        ]),
    )
}

pub fn personal_statements() -> RawTable {
    let texts = (0..APPLICANTS)
        .map(|i| format!("Statement number {i} about why I chose medicine."))
        .collect();
    one_per_applicant(FileType::PersonalStatement, "personal_statement", texts)
}

pub fn secondary() -> RawTable {
    let values = (0..APPLICANTS)
        .map(|i| if i % 3 == 0 { "Yes" } else { "No" }.to_string())
        .collect();
    one_per_applicant(FileType::SecondaryApplication, "employed_undergrad", values)
}

pub fn gpa_trend() -> RawTable {
    let trends: Vec<&str> = (0..APPLICANTS)
        .map(|i| match i % 3 {
            0 => "Upward",
            1 => "Flat",
            _ => "Downward",
        })
        .collect();
    let gpas: Vec<f64> = (0..APPLICANTS).map(|i| 3.0 + (i % 10) as f64 / 10.0).collect();
    RawTable::new(
        FileType::GpaTrend,
        frame(vec![
            Column::new("amcas_id".into(), ids(APPLICANTS)),
            Column::new("gpa_trend".into(), trends),
            Column::new("total_gpa".into(), gpas),
        ]),
    )
}

pub fn languages() -> RawTable {
    let values = (0..APPLICANTS)
        .map(|i| if i % 2 == 0 { "Spanish" } else { "English" }.to_string())
        .collect();
    one_per_applicant(FileType::Languages, "language_desc", values)
}

pub fn parents() -> RawTable {
    let values = (0..APPLICANTS)
        .map(|i| EDUCATION[i % EDUCATION.len()].to_string())
        .collect();
    one_per_applicant(FileType::Parents, "edu_level", values)
}

/// Every required export, in a fixed order.
pub fn cycle(shape: CycleShape) -> Vec<RawTable> {
    vec![
        applicants(shape),
        experiences(),
        personal_statements(),
        secondary(),
        gpa_trend(),
        languages(),
        parents(),
    ]
}

pub fn training_cycle() -> Vec<RawTable> {
    cycle(CycleShape::default())
}

pub fn scoring_cycle() -> Vec<RawTable> {
    cycle(CycleShape {
        labelled: false,
        ..CycleShape::default()
    })
}

/// Replaces the table of `file_type` in `tables`.
pub fn replace(tables: &mut [RawTable], table: RawTable) {
    for slot in tables.iter_mut() {
        if slot.file_type() == table.file_type() {
            *slot = table;
            return;
        }
    }
    panic!("no table of type {}", table.file_type());
}
