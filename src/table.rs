//! In-memory feature tables.

use crate::error::{Error, Result};

/// Named numeric columns sharing one row count.
///
/// Data is stored column-major so that a single column can be replaced
/// without touching the others.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    row_count: usize,
}

impl FeatureTable {
    /// Creates a table from `(name, values)` pairs, checking that all columns
    /// have the same length and that names are unique.
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let row_count = columns.first().map_or(0, |(_, values)| values.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            if values.len() != row_count {
                return Err(Error::LengthMismatch {
                    expected: row_count,
                    actual: values.len(),
                });
            }
            if names.contains(&name) {
                return Err(Error::DuplicateColumn { column: name });
            }
            names.push(name);
            data.push(values);
        }
        Ok(Self {
            names,
            columns: data,
            row_count,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Position of `name` among the columns.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        let idx = self.column_index(name)?;
        Ok(&self.columns[idx])
    }

    pub fn column_at(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    /// Replaces column `name` in place.
    pub fn replace_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.row_count {
            return Err(Error::LengthMismatch {
                expected: self.row_count,
                actual: values.len(),
            });
        }
        let idx = self.column_index(name)?;
        self.columns[idx] = values;
        Ok(())
    }
}

/// A feature table together with the target column that was split out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: FeatureTable,
    pub target_name: String,
    pub target: Vec<f64>,
}

impl Dataset {
    pub fn new(features: FeatureTable, target_name: &str, target: Vec<f64>) -> Result<Self> {
        if target.len() != features.row_count() {
            return Err(Error::LengthMismatch {
                expected: features.row_count(),
                actual: target.len(),
            });
        }
        Ok(Self {
            features,
            target_name: target_name.to_string(),
            target,
        })
    }

    pub fn row_count(&self) -> usize {
        self.target.len()
    }
}
