//! Applicant-level dataset produced by assembly.

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame};
use sha2::{Digest, Sha256};

use triage_standards::features::{
    BINARY_FEATURES, CATEGORICAL_FEATURES, EXPERIENCE_FLAGS, NUMERIC_FEATURES,
};

use crate::error::Result;

/// Name of the identifier column in applicant-level frames and feature tables.
pub const ID_COLUMN: &str = "amcas_id";

/// Observed values for one applicant. An absent key means the value is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicantRecord {
    pub amcas_id: String,
    pub numeric: BTreeMap<String, f64>,
    pub binary: BTreeMap<String, bool>,
    pub categorical: BTreeMap<String, String>,
    pub label: Option<f64>,
}

impl ApplicantRecord {
    pub fn new(amcas_id: impl Into<String>) -> Self {
        Self {
            amcas_id: amcas_id.into(),
            ..Self::default()
        }
    }

    pub fn with_numeric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.numeric.insert(name.into(), value);
        self
    }

    pub fn with_binary(mut self, name: impl Into<String>, value: bool) -> Self {
        self.binary.insert(name.into(), value);
        self
    }

    pub fn with_category(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.categorical.insert(name.into(), value.into());
        self
    }

    pub fn with_label(mut self, label: f64) -> Self {
        self.label = Some(label);
        self
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.numeric.get(name).copied()
    }

    pub fn binary(&self, name: &str) -> Option<bool> {
        self.binary.get(name).copied()
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.categorical.get(name).map(String::as_str)
    }
}

/// One record per primary applicant, in primary-file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicantDataset {
    records: Vec<ApplicantRecord>,
}

impl ApplicantDataset {
    pub fn new(records: Vec<ApplicantRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ApplicantRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, amcas_id: &str) -> Option<&ApplicantRecord> {
        self.records.iter().find(|record| record.amcas_id == amcas_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.amcas_id.as_str())
    }

    pub fn labelled_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.label.is_some())
            .count()
    }

    /// SHA-256 over every identifier and observed value, hex encoded.
    ///
    /// Equal datasets in the same order have equal signatures.
    pub fn signature(&self) -> String {
        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update(record.amcas_id.as_bytes());
            for (name, value) in &record.numeric {
                hasher.update([0x1f]);
                hasher.update(name.as_bytes());
                hasher.update(value.to_bits().to_le_bytes());
            }
            for (name, value) in &record.binary {
                hasher.update([0x1f]);
                hasher.update(name.as_bytes());
                hasher.update([u8::from(*value)]);
            }
            for (name, value) in &record.categorical {
                hasher.update([0x1f]);
                hasher.update(name.as_bytes());
                hasher.update([0x1d]);
                hasher.update(value.as_bytes());
            }
            if let Some(label) = record.label {
                hasher.update([0x1c]);
                hasher.update(label.to_bits().to_le_bytes());
            }
            hasher.update([0x1e]);
        }
        hex::encode(hasher.finalize())
    }

    /// Observed values as a frame, with missing values as nulls.
    ///
    /// Binary fields become 0/1 floats so they can be screened for
    /// prevalence changes alongside the numeric columns.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(
            1 + NUMERIC_FEATURES.len()
                + BINARY_FEATURES.len()
                + EXPERIENCE_FLAGS.len()
                + CATEGORICAL_FEATURES.len(),
        );
        let ids: Vec<&str> = self.ids().collect();
        columns.push(Column::new(ID_COLUMN.into(), ids));

        for name in NUMERIC_FEATURES {
            let values: Vec<Option<f64>> =
                self.records.iter().map(|record| record.numeric(name)).collect();
            columns.push(Column::new(name.into(), values));
        }
        for name in BINARY_FEATURES.iter().chain(EXPERIENCE_FLAGS.iter()) {
            let values: Vec<Option<f64>> = self
                .records
                .iter()
                .map(|record| record.binary(name).map(|flag| if flag { 1.0 } else { 0.0 }))
                .collect();
            columns.push(Column::new((*name).into(), values));
        }
        for name in CATEGORICAL_FEATURES {
            let values: Vec<Option<&str>> =
                self.records.iter().map(|record| record.category(name)).collect();
            columns.push(Column::new(name.into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }
}
