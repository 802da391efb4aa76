//! Joins the per-file exports into one record per applicant.
//!
//! Input frames carry canonical column names (see `triage_map::canonical_frame`).
//! Auxiliary files contribute aggregates keyed by the canonical join key;
//! applicants without auxiliary rows simply lack those values.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use triage_ingest::{column_keys, column_numbers, column_strings, parse_f64};
use triage_model::FileType;
use triage_standards::TriageConfig;
use triage_standards::features::{BINARY_FEATURES, NUMERIC_FEATURES};

use crate::dataset::{ApplicantDataset, ApplicantRecord};
use crate::error::{FeatureError, Result};

const LANGUAGE_COUNT: &str = "num_languages";
const PARENT_EDUCATION: &str = "parent_max_education_ordinal";
const EDUCATION_LEVEL: &str = "edu_level";
const UNKNOWN_EDUCATION: f64 = 2.0;
const EXPERIENCE_TYPE: &str = "exp_type";
const EXPERIENCE_TEXT: [&str; 2] = ["exp_name", "exp_desc"];
const GPA_TREND: &str = "gpa_trend";
const EMPLOYED_UNDERGRAD: &str = "employed_undergrad";

/// Parent education levels as exported, with their ordinal rank.
const EDUCATION_ORDINALS: [(&str, f64); 22] = [
    ("less than high school", 0.0),
    ("high school graduate (high school diploma or equivalent)", 1.0),
    ("some college, but no degree", 2.0),
    ("associates degree (as,an,etc.)", 3.0),
    ("bachelor degree (ba,bs,etc)", 4.0),
    ("some graduate,but no degree", 5.0),
    ("masters degree", 5.0),
    ("don't know", 2.0),
    ("doctorate of medicine (md)", 6.0),
    ("doctor of philosophy (phd)", 6.0),
    ("doctor of jurisprudence", 6.0),
    ("md/phd", 6.0),
    ("doctor of pharmacy", 6.0),
    ("other doctorate degree", 6.0),
    ("doctor of dental science(dds,dmd)", 6.0),
    ("doctor of veterinary medicine", 6.0),
    ("doctor of chiropractic", 6.0),
    ("doctor of science", 6.0),
    ("doctor of education", 6.0),
    ("doctor of osteopathic medicine/osteopathy(do)", 6.0),
    ("doctor of optometry", 6.0),
    ("doctor of podiatric medicine/podiatry", 6.0),
];

/// Experience type substrings and the flag each one sets.
const EXPERIENCE_TYPE_FLAGS: [(&str, &str); 7] = [
    ("physician shadowing/clinical observation", "has_shadowing"),
    ("community service/volunteer - medical/clinical", "has_volunteering"),
    ("community service/volunteer - not medical/clinical", "has_community_service"),
    ("paid employment - medical/clinical", "has_clinical_experience"),
    ("research/lab", "has_research"),
    ("leadership - not listed elsewhere", "has_leadership"),
    ("military service", "has_military_service"),
];

/// Experience types that count as direct patient care.
const PATIENT_CARE_TYPES: [&str; 3] = [
    "physician shadowing/clinical observation",
    "paid employment - medical/clinical",
    "community service/volunteer - medical/clinical",
];

const HONORS_KEYWORDS: [&str; 6] = [
    "honor",
    "honours",
    "dean's list",
    "cum laude",
    "phi beta kappa",
    "award",
];

/// Column names assembly relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    pub join_key: String,
    pub label: Option<String>,
}

impl AssembleOptions {
    pub fn from_config(config: &TriageConfig) -> Self {
        Self {
            join_key: config.join_key.name.clone(),
            label: config
                .label_target(FileType::Applicants)
                .map(|target| target.name.clone()),
        }
    }
}

/// Builds the applicant-level dataset from canonical frames.
pub fn assemble(
    frames: &BTreeMap<FileType, DataFrame>,
    options: &AssembleOptions,
) -> Result<ApplicantDataset> {
    let applicants = frames
        .get(&FileType::Applicants)
        .ok_or(FeatureError::MissingPrimary)?;
    let mut records = primary_records(applicants, options)?;
    let index: BTreeMap<String, usize> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| (record.amcas_id.clone(), idx))
        .collect();

    for (&file_type, df) in frames {
        if file_type.is_primary() || !has_column(df, &options.join_key) {
            continue;
        }
        let keys = column_keys(df, &options.join_key)?;
        let contributed = match file_type {
            FileType::Languages => {
                apply_numeric(&mut records, &index, LANGUAGE_COUNT, count_rows(&keys))
            }
            FileType::Parents => apply_numeric(
                &mut records,
                &index,
                PARENT_EDUCATION,
                parent_education(df, &keys)?,
            ),
            FileType::Experiences => {
                apply_flags(&mut records, &index, experience_flags(df, &keys)?)
            }
            FileType::GpaTrend => apply_category(
                &mut records,
                &index,
                GPA_TREND,
                first_text(df, &keys, GPA_TREND)?,
            ),
            FileType::SecondaryApplication => {
                let text = first_text(df, &keys, EMPLOYED_UNDERGRAD)?;
                let flags = text
                    .into_iter()
                    .filter_map(|(key, value)| parse_binary(&value).map(|flag| (key, flag)))
                    .collect();
                apply_binary(&mut records, &index, EMPLOYED_UNDERGRAD, flags)
            }
            _ => 0,
        };
        debug!(
            file_type = %file_type,
            applicants = contributed,
            "joined auxiliary values"
        );
    }

    info!(
        applicants = records.len(),
        labelled = records.iter().filter(|record| record.label.is_some()).count(),
        "assembled applicant dataset"
    );
    Ok(ApplicantDataset::new(records))
}

/// Interprets a yes/no style cell. Unrecognized text counts as "no".
pub fn parse_binary(value: &str) -> Option<bool> {
    let lowered = value.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    match lowered.as_str() {
        "yes" | "y" | "true" | "t" => return Some(true),
        "no" | "n" | "false" | "f" => return Some(false),
        _ => {}
    }
    if let Some(number) = parse_f64(&lowered) {
        return Some(number != 0.0);
    }
    Some(lowered.starts_with('y'))
}

/// Ordinal rank of a parent education level; unknown levels rank 2.
pub fn education_ordinal(level: &str) -> f64 {
    let lowered = level.trim().to_lowercase();
    EDUCATION_ORDINALS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map_or(UNKNOWN_EDUCATION, |(_, rank)| *rank)
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names()
        .iter()
        .any(|column| column.as_str() == name)
}

fn primary_records(
    applicants: &DataFrame,
    options: &AssembleOptions,
) -> Result<Vec<ApplicantRecord>> {
    let keys = column_keys(applicants, &options.join_key)?;
    let mut records: Vec<ApplicantRecord> = Vec::with_capacity(keys.len());
    let mut rows: Vec<Option<usize>> = Vec::with_capacity(keys.len());
    let mut seen = BTreeSet::new();
    let mut repeated = 0usize;
    for key in keys {
        match key {
            Some(key) if seen.insert(key.clone()) => {
                rows.push(Some(records.len()));
                records.push(ApplicantRecord::new(key));
            }
            Some(_) => {
                repeated += 1;
                rows.push(None);
            }
            None => rows.push(None),
        }
    }
    if repeated > 0 {
        warn!(repeated, "repeated applicant ids; keeping the first row of each");
    }

    for name in NUMERIC_FEATURES {
        if !has_column(applicants, name) {
            continue;
        }
        for (row, value) in column_numbers(applicants, name)?.into_iter().enumerate() {
            if let (Some(Some(idx)), Some(value)) = (rows.get(row), value) {
                records[*idx].numeric.insert(name.to_string(), value);
            }
        }
    }
    for name in BINARY_FEATURES {
        if !has_column(applicants, name) {
            continue;
        }
        for (row, value) in column_strings(applicants, name)?.into_iter().enumerate() {
            let flag = value.as_deref().and_then(parse_binary);
            if let (Some(Some(idx)), Some(flag)) = (rows.get(row), flag) {
                records[*idx].binary.insert(name.to_string(), flag);
            }
        }
    }
    if let Some(label) = options.label.as_deref().filter(|label| has_column(applicants, label)) {
        for (row, value) in column_numbers(applicants, label)?.into_iter().enumerate() {
            if let Some(Some(idx)) = rows.get(row) {
                records[*idx].label = value;
            }
        }
    }
    Ok(records)
}

fn count_rows(keys: &[Option<String>]) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for key in keys.iter().flatten() {
        *counts.entry(key.clone()).or_insert(0.0) += 1.0;
    }
    counts
}

fn parent_education(df: &DataFrame, keys: &[Option<String>]) -> Result<BTreeMap<String, f64>> {
    let mut best: BTreeMap<String, f64> = BTreeMap::new();
    if !has_column(df, EDUCATION_LEVEL) {
        warn!("parents file has no education level column");
        return Ok(best);
    }
    let levels = column_strings(df, EDUCATION_LEVEL)?;
    for (key, level) in keys.iter().zip(levels) {
        let Some(key) = key else { continue };
        let rank = level.as_deref().map_or(UNKNOWN_EDUCATION, education_ordinal);
        best.entry(key.clone())
            .and_modify(|current| *current = current.max(rank))
            .or_insert(rank);
    }
    Ok(best)
}

#[derive(Default)]
struct ExperienceText {
    types: Vec<String>,
    text: String,
}

fn experience_flags(
    df: &DataFrame,
    keys: &[Option<String>],
) -> Result<BTreeMap<String, BTreeMap<&'static str, bool>>> {
    if !has_column(df, EXPERIENCE_TYPE) {
        warn!("experiences file has no experience type column");
        return Ok(BTreeMap::new());
    }
    let types = column_strings(df, EXPERIENCE_TYPE)?;
    let mut text_columns = Vec::new();
    for name in EXPERIENCE_TEXT {
        if has_column(df, name) {
            text_columns.push(column_strings(df, name)?);
        }
    }

    let mut grouped: BTreeMap<String, ExperienceText> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        let Some(key) = key else { continue };
        let entry = grouped.entry(key.clone()).or_default();
        if let Some(exp_type) = &types[row] {
            entry.types.push(exp_type.to_lowercase());
        }
        for column in &text_columns {
            if let Some(text) = &column[row] {
                entry.text.push(' ');
                entry.text.push_str(&text.to_lowercase());
            }
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(key, experience)| (key, flags_for(&experience)))
        .collect())
}

fn flags_for(experience: &ExperienceText) -> BTreeMap<&'static str, bool> {
    let mentions = |needle: &str| experience.types.iter().any(|t| t.contains(needle));
    let mut flags: BTreeMap<&'static str, bool> = EXPERIENCE_TYPE_FLAGS
        .iter()
        .map(|(needle, flag)| (*flag, mentions(needle)))
        .collect();
    flags.insert(
        "has_direct_patient_care",
        PATIENT_CARE_TYPES.iter().any(|needle| mentions(needle)),
    );
    flags.insert(
        "has_honors",
        HONORS_KEYWORDS
            .iter()
            .any(|keyword| experience.text.contains(keyword)),
    );
    flags
}

fn first_text(
    df: &DataFrame,
    keys: &[Option<String>],
    column: &str,
) -> Result<BTreeMap<String, String>> {
    let mut first = BTreeMap::new();
    if !has_column(df, column) {
        return Ok(first);
    }
    for (key, value) in keys.iter().zip(column_strings(df, column)?) {
        if let (Some(key), Some(value)) = (key, value) {
            first.entry(key.clone()).or_insert(value);
        }
    }
    Ok(first)
}

fn apply_numeric(
    records: &mut [ApplicantRecord],
    index: &BTreeMap<String, usize>,
    name: &str,
    values: BTreeMap<String, f64>,
) -> usize {
    let mut applied = 0;
    for (key, value) in values {
        if let Some(&idx) = index.get(&key) {
            records[idx].numeric.insert(name.to_string(), value);
            applied += 1;
        }
    }
    applied
}

fn apply_binary(
    records: &mut [ApplicantRecord],
    index: &BTreeMap<String, usize>,
    name: &str,
    values: BTreeMap<String, bool>,
) -> usize {
    let mut applied = 0;
    for (key, value) in values {
        if let Some(&idx) = index.get(&key) {
            records[idx].binary.insert(name.to_string(), value);
            applied += 1;
        }
    }
    applied
}

fn apply_category(
    records: &mut [ApplicantRecord],
    index: &BTreeMap<String, usize>,
    name: &str,
    values: BTreeMap<String, String>,
) -> usize {
    let mut applied = 0;
    for (key, value) in values {
        if let Some(&idx) = index.get(&key) {
            records[idx].categorical.insert(name.to_string(), value);
            applied += 1;
        }
    }
    applied
}

fn apply_flags(
    records: &mut [ApplicantRecord],
    index: &BTreeMap<String, usize>,
    flags: BTreeMap<String, BTreeMap<&'static str, bool>>,
) -> usize {
    let mut applied = 0;
    for (key, values) in flags {
        if let Some(&idx) = index.get(&key) {
            for (flag, value) in values {
                records[idx].binary.insert(flag.to_string(), value);
            }
            applied += 1;
        }
    }
    applied
}
