//! Schema snapshots and schema evolution between cycles.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{Column, DataType};
use serde::{Deserialize, Serialize};

use triage_ingest::{RawTable, any_to_string_non_empty, column_strings, parse_f64};
use triage_map::{Reconciliation, header_similarity};
use triage_model::{Category, FileType, ValidationMessage, normalize_header};
use triage_standards::TriageConfig;

use crate::checks::null_mask;
use crate::coding::{CodingScheme, compare_coding, infer_coding_scheme};
use crate::error::Result;

/// Broad value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer,
    Float,
    Boolean,
    Text,
    /// No values at all; carries no type information.
    Empty,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Empty => "empty",
        }
    }
}

/// Shape of one column in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub raw_name: String,
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coding: Option<CodingScheme>,
}

/// Column layout of one file in one cycle.
///
/// Keys are canonical names for reconciled targets and normalized headers
/// for everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub file_type: FileType,
    pub columns: BTreeMap<String, ColumnProfile>,
}

impl SchemaSnapshot {
    pub fn from_table(
        table: &RawTable,
        reconciliation: &Reconciliation,
        config: &TriageConfig,
    ) -> Result<Self> {
        let canonical_by_raw: BTreeMap<&str, &str> = reconciliation
            .resolved()
            .map(|(canonical, raw)| (raw, canonical))
            .collect();

        let mut columns = BTreeMap::new();
        for column in table.data().get_columns() {
            let raw_name = column.name().to_string();
            let key = canonical_by_raw
                .get(raw_name.as_str())
                .map_or_else(|| normalize_header(&raw_name), |canonical| (*canonical).to_string());
            if key.is_empty() || columns.contains_key(&key) {
                continue;
            }
            let value_type = infer_value_type(column)?;
            let coding = if config.is_coded(&key) {
                let values = column_strings(table.data(), &raw_name)?;
                infer_coding_scheme(values.into_iter().flatten())
            } else {
                None
            };
            columns.insert(
                key,
                ColumnProfile {
                    raw_name,
                    value_type,
                    coding,
                },
            );
        }

        Ok(Self {
            file_type: table.file_type(),
            columns,
        })
    }

    pub fn column(&self, key: &str) -> Option<&ColumnProfile> {
        self.columns.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

fn infer_value_type(column: &Column) -> Result<ValueType> {
    if null_mask(column).iter().all(|is_null| *is_null) {
        return Ok(ValueType::Empty);
    }
    let dtype = column.dtype();
    Ok(match dtype {
        DataType::Boolean => ValueType::Boolean,
        DataType::String => infer_text_type(column)?,
        _ if dtype.is_integer() => ValueType::Integer,
        _ if dtype.is_float() => ValueType::Float,
        _ => ValueType::Text,
    })
}

/// Classify a text column by what all of its values parse as.
fn infer_text_type(column: &Column) -> Result<ValueType> {
    let mut all_integer = true;
    let mut all_float = true;
    let mut all_boolean = true;
    for idx in 0..column.len() {
        let Some(value) = any_to_string_non_empty(column.get(idx)?) else {
            continue;
        };
        all_integer &= value.parse::<i64>().is_ok();
        all_float &= parse_f64(&value).is_some();
        all_boolean &= matches!(value.to_lowercase().as_str(), "true" | "false");
    }
    Ok(if all_integer {
        ValueType::Integer
    } else if all_float {
        ValueType::Float
    } else if all_boolean {
        ValueType::Boolean
    } else {
        ValueType::Text
    })
}

/// Classify the differences between a reference snapshot and the current one.
pub fn compare_schemas(
    reference: &SchemaSnapshot,
    current: &SchemaSnapshot,
    config: &TriageConfig,
) -> Vec<ValidationMessage> {
    let file_type = current.file_type;
    let mut messages = Vec::new();

    let added: Vec<&str> = current
        .keys()
        .filter(|key| reference.column(key).is_none())
        .collect();
    let mut removed: BTreeSet<&str> = reference
        .keys()
        .filter(|key| current.column(key).is_none())
        .collect();

    for key in added {
        match rename_source(file_type, key, &removed, config) {
            Some((old, score)) => {
                removed.remove(old);
                messages.push(
                    ValidationMessage::info(
                        Category::Schema,
                        "column_renamed",
                        format!("{old} appears to have been renamed to {key}"),
                    )
                    .for_file(file_type)
                    .with_detail("old", old)
                    .with_detail("new", key)
                    .with_detail("similarity", score),
                );
            }
            None => messages.push(
                ValidationMessage::info(
                    Category::Schema,
                    "column_added",
                    format!("new column {key} in {file_type}"),
                )
                .for_file(file_type)
                .with_detail("column", key),
            ),
        }
    }

    let spec = config.file_type_spec(file_type);
    for key in removed {
        let critical = spec.is_some_and(|spec| spec.is_critical(key));
        let text = format!("column {key} is no longer present in {file_type}");
        let message = if critical {
            ValidationMessage::error(Category::Schema, "column_removed", text)
                .with_recommendation("This column is required; check the export layout")
        } else {
            ValidationMessage::warning(Category::Schema, "column_removed", text)
        };
        messages.push(
            message
                .for_file(file_type)
                .with_detail("column", key)
                .with_detail("critical", critical),
        );
    }

    for (key, current_profile) in &current.columns {
        let Some(reference_profile) = reference.column(key) else {
            continue;
        };
        let (old, new) = (reference_profile.value_type, current_profile.value_type);
        if old != new && old != ValueType::Empty && new != ValueType::Empty {
            messages.push(
                ValidationMessage::warning(
                    Category::Schema,
                    "column_type_changed",
                    format!("{key} changed from {} to {}", old.as_str(), new.as_str()),
                )
                .for_file(file_type)
                .with_detail("column", key.clone())
                .with_detail("reference", old.as_str())
                .with_detail("current", new.as_str()),
            );
        }
        if let (Some(old), Some(new)) = (&reference_profile.coding, &current_profile.coding)
            && let Some(message) = compare_coding(file_type, key, old, new)
        {
            messages.push(message);
        }
    }

    messages
}

/// Best removed column that `added` looks like a rename of.
fn rename_source<'a>(
    file_type: FileType,
    added: &str,
    removed: &BTreeSet<&'a str>,
    config: &TriageConfig,
) -> Option<(&'a str, f64)> {
    let targets = config.targets_for(file_type);
    let mut best: Option<(&'a str, f64)> = None;
    for old in removed {
        let is_alias = targets.iter().any(|target| {
            target.name == *old
                && target
                    .aliases
                    .iter()
                    .any(|alias| normalize_header(alias) == added)
        });
        let score = if is_alias {
            1.0
        } else {
            header_similarity(old, added)
        };
        if score >= config.matching.feature_threshold
            && best.is_none_or(|(_, best_score)| score > best_score)
        {
            best = Some((*old, score));
        }
    }
    best
}
