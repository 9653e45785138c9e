use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use super::scenario::{Scenario, Variant};
use super::stats::DifferenceStats;
use crate::error::{Error, Result};

/// Header of the summary table; matches the serialized field order of [`ResultRow`].
pub const SUMMARY_COLUMNS: [&str; 8] = [
    "temp_decrease",
    "air_decrease",
    "air_limited",
    "prop_boundary",
    "mean_difference",
    "median_difference",
    "min_difference",
    "max_difference",
];

/// Outcome of one scenario. Field order is the summary table's column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub temp_decrease: f64,
    pub air_decrease: f64,
    #[serde(rename = "air_limited")]
    pub variant: Variant,
    /// Fraction of rows whose original airflow value hits the variant floor.
    #[serde(rename = "prop_boundary")]
    pub boundary_fraction: f64,
    pub mean_difference: f64,
    pub median_difference: f64,
    pub min_difference: f64,
    pub max_difference: f64,
}

impl ResultRow {
    pub fn new(scenario: &Scenario, boundary_fraction: f64, stats: DifferenceStats) -> Self {
        Self {
            temp_decrease: scenario.temp_decrease,
            air_decrease: scenario.air_decrease,
            variant: scenario.variant,
            boundary_fraction,
            mean_difference: stats.mean,
            median_difference: stats.median,
            min_difference: stats.min,
            max_difference: stats.max,
        }
    }

    pub fn scenario(&self) -> Scenario {
        Scenario {
            temp_decrease: self.temp_decrease,
            air_decrease: self.air_decrease,
            variant: self.variant,
        }
    }
}

/// Ordered rows of one grid evaluation, in scenario enumeration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub rows: Vec<ResultRow>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter()
    }

    /// Writes the summary table with its header row, also when there are no rows.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        wtr.write_record(SUMMARY_COLUMNS)?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush().map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    /// Reads a summary table written by [`Self::write_csv`].
    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));
        let rows = rdr
            .deserialize()
            .collect::<std::result::Result<Vec<ResultRow>, csv::Error>>()?;
        Ok(Self { rows })
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>8} | {:>8} | {:<13} | {:>8} | {:>10} | {:>10} | {:>10} | {:>10}",
            "temp", "air", "variant", "boundary", "mean", "median", "min", "max"
        )?;
        writeln!(f, "{}", "-".repeat(101))?;
        for r in &self.rows {
            writeln!(
                f,
                "{:>8} | {:>8} | {:<13} | {:>8.3} | {:>10.4} | {:>10.4} | {:>10.4} | {:>10.4}",
                r.temp_decrease,
                r.air_decrease,
                r.variant.as_str(),
                r.boundary_fraction,
                r.mean_difference,
                r.median_difference,
                r.min_difference,
                r.max_difference,
            )?;
        }
        Ok(())
    }
}
