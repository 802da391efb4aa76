//! Duplicate detection.
//!
//! One-per-applicant files must not repeat a join key. One-to-many files may,
//! so only rows that repeat every cell are flagged there.

use std::collections::{BTreeMap, HashSet};

use polars::prelude::{AnyValue, DataFrame};

use triage_ingest::{any_to_string, canonical_key};
use triage_map::Reconciliation;
use triage_model::{Cardinality, Category, ValidationMessage};

use super::SAMPLE_SIZE;

pub fn check(df: &DataFrame, reconciliation: &Reconciliation) -> Vec<ValidationMessage> {
    match reconciliation.file_type().cardinality() {
        Cardinality::OnePerApplicant => duplicate_keys(df, reconciliation),
        Cardinality::OneToMany => duplicate_rows(df, reconciliation),
    }
}

fn duplicate_keys(df: &DataFrame, reconciliation: &Reconciliation) -> Vec<ValidationMessage> {
    let file_type = reconciliation.file_type();
    let Some(key_column) = reconciliation
        .join_key_column()
        .and_then(|raw| df.column(raw).ok())
    else {
        return Vec::new();
    };

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for idx in 0..key_column.len() {
        if let Some(key) = canonical_key(key_column.get(idx).unwrap_or(AnyValue::Null)) {
            *counts.entry(key).or_default() += 1;
        }
    }
    let duplicated: Vec<&String> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(key, _)| key)
        .collect();
    if duplicated.is_empty() {
        return Vec::new();
    }
    let extra_rows: usize = counts.values().filter(|count| **count > 1).map(|c| c - 1).sum();
    let sample: Vec<String> = duplicated
        .iter()
        .take(SAMPLE_SIZE)
        .map(|key| (*key).clone())
        .collect();

    vec![
        ValidationMessage::error(
            Category::DataQuality,
            "duplicate_join_keys",
            format!(
                "{} applicants appear more than once in {file_type}",
                duplicated.len()
            ),
        )
        .for_file(file_type)
        .with_detail("distinct_keys", duplicated.len())
        .with_detail("extra_rows", extra_rows)
        .with_detail("sample_ids", sample)
        .with_recommendation("Each applicant must appear once in this file"),
    ]
}

fn duplicate_rows(df: &DataFrame, reconciliation: &Reconciliation) -> Vec<ValidationMessage> {
    let file_type = reconciliation.file_type();
    let columns = df.get_columns();
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(df.height());
    let mut duplicates = 0usize;

    for idx in 0..df.height() {
        let row: Vec<String> = columns
            .iter()
            .map(|column| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
            .map(|cell| cell.trim().to_string())
            .collect();
        if !seen.insert(row) {
            duplicates += 1;
        }
    }
    if duplicates == 0 {
        return Vec::new();
    }

    vec![
        ValidationMessage::warning(
            Category::DataQuality,
            "duplicate_rows",
            format!("{duplicates} rows in {file_type} repeat an earlier row exactly"),
        )
        .for_file(file_type)
        .with_detail("count", duplicates),
    ]
}
