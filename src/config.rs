//! Sweep configuration.
//!
//! The configuration is read from a JSON document whose keys mirror the
//! pipeline's parameter files. Unknown keys and missing required keys are
//! rejected at load time, and [`OptimizeConfig::validate`] checks the values
//! before any file is touched.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sweep::transform::Floors;

/// Selects which destination directory a sweep reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Full pipeline run; uses `final_output`.
    Train,
    /// Run on the held-out evaluation subset; uses `test_directory`.
    Evaluate,
}

/// The two decrement lists swept by the grid, with the columns they apply to.
///
/// `airflow_values` drives the outer loop and `temperature_values` the inner
/// loop. The nesting is fixed by field, never by key order in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizeOptions {
    /// Temperature-like column reduced with a floor of 0 in every variant.
    pub temperature_column: String,
    /// Temperature decrements, in sweep order.
    pub temperature_values: Vec<f64>,
    /// Air/occupancy-like column reduced with a variant-specific floor.
    pub airflow_column: String,
    /// Airflow decrements, in sweep order.
    pub airflow_values: Vec<f64>,
}

impl OptimizeOptions {
    /// Number of scenarios the grid produces (three variants per pair).
    pub fn scenario_count(&self) -> usize {
        self.temperature_values.len() * self.airflow_values.len() * 3
    }

    fn validate(&self, output_col: &str) -> Result<()> {
        if self.temperature_column.is_empty() || self.airflow_column.is_empty() {
            return Err(Error::config("optimize_options: column names must not be empty"));
        }
        if self.temperature_column == self.airflow_column {
            return Err(Error::config(format!(
                "optimize_options: temperature and airflow columns are both `{}`",
                self.temperature_column
            )));
        }
        for column in [&self.temperature_column, &self.airflow_column] {
            if column == output_col {
                return Err(Error::config(format!(
                    "optimize_options: `{column}` is the target column"
                )));
            }
        }
        for (name, values) in [
            ("temperature_values", &self.temperature_values),
            ("airflow_values", &self.airflow_values),
        ] {
            if values.is_empty() {
                return Err(Error::config(format!("optimize_options.{name} is empty")));
            }
            if let Some(v) = values.iter().find(|v| !v.is_finite()) {
                return Err(Error::config(format!(
                    "optimize_options.{name} contains a non-finite value ({v})"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration of one sweep invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizeConfig {
    /// File name of the summary table, written to the mode's destination directory.
    pub optimize_results: String,
    /// Target column excluded from model input.
    pub output_col: String,
    /// Destination directory in [`RunMode::Train`].
    #[serde(default)]
    pub final_output: Option<PathBuf>,
    /// Destination directory in [`RunMode::Evaluate`].
    #[serde(default)]
    pub test_directory: Option<PathBuf>,
    /// File name of the source feature table inside the destination directory.
    pub train_data: String,
    /// Directory receiving one transformed table per scenario.
    pub optimize_versions_folder: PathBuf,
    pub optimize_options: OptimizeOptions,
    /// Airflow floor of the `occupied_low` variant.
    pub optimization_room_min: f64,
    /// Airflow floor of the `occupied_high` variant.
    pub optimization_room_avgmin: f64,
}

impl OptimizeConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("optimize_results", &self.optimize_results),
            ("output_col", &self.output_col),
            ("train_data", &self.train_data),
        ] {
            if value.is_empty() {
                return Err(Error::config(format!("`{key}` must not be empty")));
            }
        }
        if self.optimize_versions_folder.as_os_str().is_empty() {
            return Err(Error::config("`optimize_versions_folder` must not be empty"));
        }
        if self.final_output.is_none() && self.test_directory.is_none() {
            return Err(Error::config(
                "one of `final_output` or `test_directory` is required",
            ));
        }
        if !self.optimization_room_min.is_finite() || !self.optimization_room_avgmin.is_finite()
        {
            return Err(Error::config("optimization floors must be finite"));
        }
        self.optimize_options.validate(&self.output_col)
    }

    /// Destination directory for `mode`, relative to the run root.
    pub fn destination_dir(&self, mode: RunMode) -> Result<&Path> {
        let (key, dir) = match mode {
            RunMode::Train => ("final_output", &self.final_output),
            RunMode::Evaluate => ("test_directory", &self.test_directory),
        };
        dir.as_deref()
            .ok_or_else(|| Error::config(format!("`{key}` is required in {mode:?} mode")))
    }

    pub fn floors(&self) -> Floors {
        Floors {
            room_min: self.optimization_room_min,
            room_avgmin: self.optimization_room_avgmin,
        }
    }
}
