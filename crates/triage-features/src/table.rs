//! The model-ready feature table.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::{Column, CsvWriter, DataFrame, SerWriter};
use tracing::info;

use crate::dataset::ID_COLUMN;
use crate::error::{FeatureError, Result};

/// Rows in applicant order, columns in the fitted `feature_columns` order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    ids: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub(crate) fn new(ids: Vec<String>, columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self { ids, columns, rows }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn value(&self, amcas_id: &str, column: &str) -> Option<f64> {
        let row = self.ids.iter().position(|id| id == amcas_id)?;
        let col = self.column_index(column)?;
        Some(self.rows[row][col])
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<f64>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[col]).collect())
    }

    /// `amcas_id` followed by every feature column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(ID_COLUMN.into(), self.ids.clone()));
        for (idx, name) in self.columns.iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|row| row[idx]).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FeatureError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let mut frame = self.to_frame()?;
        let mut file = File::create(path).map_err(|e| FeatureError::Io {
            operation: "create",
            path: path.to_path_buf(),
            source: e,
        })?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)?;
        info!(
            path = %path.display(),
            rows = self.height(),
            columns = self.width(),
            "wrote feature table"
        );
        Ok(())
    }
}
