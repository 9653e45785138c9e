//! Filesystem cache and persistence of sweep results.
//!
//! A sweep is skipped when its summary table already exists in the mode's
//! destination directory; the stored table is returned as is. The check does
//! not compare the stored grid with the requested one, so a summary produced
//! for a different grid is returned unchanged until [`ResultStore::clean`]
//! removes it.
//!
//! There is no locking between the existence check and the writes. Running
//! two sweeps against the same directories at the same time is unsupported.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::result::ResultSet;
use super::scenario::Scenario;
use crate::config::{OptimizeConfig, RunMode};
use crate::error::{Error, Result};
use crate::io::tables::write_feature_table;
use crate::table::FeatureTable;

/// Resolved locations of one sweep's inputs and outputs.
#[derive(Debug, Clone)]
pub struct ResultStore {
    destination: PathBuf,
    artifacts_dir: PathBuf,
    summary_name: String,
    source_name: String,
}

impl ResultStore {
    /// Resolves the directories for `mode` relative to `root`.
    pub fn new(root: &Path, config: &OptimizeConfig, mode: RunMode) -> Result<Self> {
        Ok(Self {
            destination: root.join(config.destination_dir(mode)?),
            artifacts_dir: root.join(&config.optimize_versions_folder),
            summary_name: config.optimize_results.clone(),
            source_name: config.train_data.clone(),
        })
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn summary_path(&self) -> PathBuf {
        self.destination.join(&self.summary_name)
    }

    /// Where the source feature table is expected when the caller supplies none.
    pub fn source_path(&self) -> PathBuf {
        self.destination.join(&self.source_name)
    }

    /// Creates the artifacts directory if it does not exist yet.
    pub fn ensure_artifacts_dir(&self) -> Result<()> {
        if !self.artifacts_dir.is_dir() {
            info!(dir = %self.artifacts_dir.display(), "creating scenario artifacts directory");
            fs::create_dir_all(&self.artifacts_dir)
                .map_err(|e| Error::io(&self.artifacts_dir, e))?;
        }
        Ok(())
    }

    /// Returns the stored summary if one exists.
    pub fn cached(&self) -> Result<Option<ResultSet>> {
        let path = self.summary_path();
        if !path.is_file() {
            return Ok(None);
        }
        info!(
            path = %path.display(),
            "summary already present, skipping sweep (run `clean` to regenerate)"
        );
        ResultSet::read_csv(&path).map(Some)
    }

    /// File name of a scenario's transformed table.
    ///
    /// Decimal points are removed from the temperature decrement only. When
    /// the grid has any fractional temperature (`decimal_temps`), every
    /// temperature keeps at least one decimal place before the point is
    /// removed, so 1.5 and 15 map to `t15` and `t150`.
    pub fn artifact_file_name(scenario: &Scenario, decimal_temps: bool) -> String {
        let t = if decimal_temps {
            format!("{:?}", scenario.temp_decrease)
        } else {
            scenario.temp_decrease.to_string()
        };
        format!(
            "optimize_t{}_a{}_{}.csv",
            t.replace('.', ""),
            scenario.air_decrease,
            scenario.variant
        )
    }

    pub fn artifact_path(&self, scenario: &Scenario, decimal_temps: bool) -> PathBuf {
        self.artifacts_dir
            .join(Self::artifact_file_name(scenario, decimal_temps))
    }

    pub fn write_artifact(
        &self,
        scenario: &Scenario,
        decimal_temps: bool,
        table: &FeatureTable,
    ) -> Result<PathBuf> {
        let path = self.artifact_path(scenario, decimal_temps);
        write_feature_table(&path, table)?;
        debug!(path = %path.display(), "wrote scenario table");
        Ok(path)
    }

    pub fn write_summary(&self, results: &ResultSet) -> Result<PathBuf> {
        fs::create_dir_all(&self.destination).map_err(|e| Error::io(&self.destination, e))?;
        let path = self.summary_path();
        results.write_csv(&path)?;
        info!(path = %path.display(), rows = results.len(), "wrote sweep summary");
        Ok(path)
    }

    /// Removes the summary from both mode directories and every file in the
    /// artifacts directory. Returns the number of files removed.
    pub fn clean(root: &Path, config: &OptimizeConfig) -> Result<usize> {
        let mut removed = 0;

        let summaries = [&config.final_output, &config.test_directory]
            .into_iter()
            .flatten()
            .map(|dir| root.join(dir).join(&config.optimize_results));
        for path in summaries {
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                removed += 1;
            }
        }

        let artifacts_dir = root.join(&config.optimize_versions_folder);
        if artifacts_dir.is_dir() {
            let entries = fs::read_dir(&artifacts_dir).map_err(|e| Error::io(&artifacts_dir, e))?;
            for entry in entries {
                let path = entry.map_err(|e| Error::io(&artifacts_dir, e))?.path();
                if path.is_file() {
                    fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                    removed += 1;
                }
            }
        }

        info!(removed, "cleaned sweep outputs");
        Ok(removed)
    }
}
