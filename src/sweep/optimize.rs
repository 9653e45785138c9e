//! Grid evaluation of setpoint reduction scenarios.
//!
//! For every scenario the feature table is copied with the two swept columns
//! reduced, scored with an already fitted model, and compared against the
//! recorded target. Results are kept in enumeration order and persisted once
//! the whole grid has been evaluated.

use std::borrow::Cow;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use super::result::{ResultRow, ResultSet};
use super::scenario::ScenarioSpace;
use super::stats::DifferenceStats;
use super::store::ResultStore;
use super::transform::FeatureTransformer;
use crate::config::{OptimizeConfig, RunMode};
use crate::error::{Error, Result};
use crate::io::tables::read_dataset;
use crate::model::{Predictor, Regressor};
use crate::table::{Dataset, FeatureTable};

/// Runs the sweep with a fitted model.
///
/// Returns the stored summary unchanged if one already exists for `mode`;
/// `model` is not queried in that case. Otherwise evaluates every scenario,
/// writes one transformed table per scenario plus the summary table, and
/// returns the summary.
///
/// When `data` is `None` the source table is read from the destination
/// directory (`train_data`); a missing file is [`Error::MissingUpstream`].
#[instrument(skip_all, fields(mode = ?mode))]
pub fn optimize_model<P: Predictor + ?Sized>(
    root: &Path,
    config: &OptimizeConfig,
    mode: RunMode,
    model: &P,
    data: Option<&Dataset>,
) -> Result<ResultSet> {
    let store = open_store(root, config, mode)?;
    if let Some(cached) = store.cached()? {
        return Ok(cached);
    }
    let data = resolve_dataset(&store, config, data)?;
    evaluate_grid(&store, config, &data, model)
}

/// Fits `regressor` once on the untransformed table, then runs the sweep.
///
/// Fitting is skipped when the summary is already stored.
#[instrument(skip_all, fields(mode = ?mode))]
pub fn fit_and_optimize<R: Regressor>(
    root: &Path,
    config: &OptimizeConfig,
    mode: RunMode,
    regressor: &R,
    data: Option<&Dataset>,
) -> Result<ResultSet> {
    let store = open_store(root, config, mode)?;
    if let Some(cached) = store.cached()? {
        return Ok(cached);
    }
    let data = resolve_dataset(&store, config, data)?;
    let model = regressor.fit(&data)?;
    info!(rows = data.row_count(), "model fitted on untransformed table");
    evaluate_grid(&store, config, &data, &model)
}

fn open_store(root: &Path, config: &OptimizeConfig, mode: RunMode) -> Result<ResultStore> {
    config.validate()?;
    let store = ResultStore::new(root, config, mode)?;
    store.ensure_artifacts_dir()?;
    Ok(store)
}

fn resolve_dataset<'a>(
    store: &ResultStore,
    config: &OptimizeConfig,
    data: Option<&'a Dataset>,
) -> Result<Cow<'a, Dataset>> {
    let data = match data {
        Some(data) => {
            if data.target_name != config.output_col {
                return Err(Error::config(format!(
                    "supplied table targets `{}` but output_col is `{}`",
                    data.target_name, config.output_col
                )));
            }
            Cow::Borrowed(data)
        }
        None => {
            let path = store.source_path();
            warn!(
                path = %path.display(),
                "no feature table supplied, reading the features stage output from disk"
            );
            if !path.is_file() {
                return Err(Error::MissingUpstream {
                    stage: "features",
                    path,
                });
            }
            Cow::Owned(read_dataset(&path, &config.output_col)?)
        }
    };
    if data.row_count() == 0 {
        return Err(Error::EmptyTable);
    }
    Ok(data)
}

fn evaluate_grid<P: Predictor + ?Sized>(
    store: &ResultStore,
    config: &OptimizeConfig,
    data: &Dataset,
    model: &P,
) -> Result<ResultSet> {
    let options = &config.optimize_options;
    let transformer = FeatureTransformer::new(
        &options.temperature_column,
        &options.airflow_column,
        config.floors(),
    );
    transformer.check_columns(&data.features)?;

    let space = ScenarioSpace::from_options(options);
    info!(
        scenarios = space.len(),
        rows = data.row_count(),
        "evaluating setpoint reduction grid"
    );

    // Parallel collections: row i of `results` belongs to `tables[i]`.
    let mut results = ResultSet::with_capacity(space.len());
    let mut tables: Vec<FeatureTable> = Vec::with_capacity(space.len());

    for scenario in space.iter() {
        let transformed = transformer.apply(&data.features, &scenario)?;
        let prediction = model.predict(&transformed)?;
        let stats = DifferenceStats::compute(&data.target, &prediction)?;
        let boundary = transformer.boundary_fraction(
            &data.features,
            scenario.air_decrease,
            scenario.variant,
        )?;
        debug!(
            t = scenario.temp_decrease,
            a = scenario.air_decrease,
            variant = %scenario.variant,
            boundary,
            mean = stats.mean,
            "scenario scored"
        );

        results.push(ResultRow::new(&scenario, boundary, stats));
        tables.push(transformed);
    }

    let decimal_temps = options
        .temperature_values
        .iter()
        .any(|t| t.fract() != 0.0);
    for (row, table) in results.iter().zip(&tables) {
        store.write_artifact(&row.scenario(), decimal_temps, table)?;
    }
    store.write_summary(&results)?;

    Ok(results)
}
