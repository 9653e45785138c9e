use std::cell::Cell;
use std::path::Path;

use anyhow::Result;
use setpoint_sweep::io::{read_feature_table, write_dataset};
use setpoint_sweep::sweep::ResultStore;
use setpoint_sweep::{
    Dataset, DecisionTreeRegressor, Error, FeatureTable, OptimizeConfig, Predictor, RunMode,
    Variant, fit_and_optimize, optimize_model,
};
use tempfile::tempdir;

/// Predicts the airflow column as is and counts how often it was asked.
struct AirflowEcho {
    calls: Cell<usize>,
}

impl AirflowEcho {
    fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl Predictor for AirflowEcho {
    fn predict(&self, features: &FeatureTable) -> setpoint_sweep::Result<Vec<f64>> {
        self.calls.set(self.calls.get() + 1);
        Ok(features.column("airflow")?.to_vec())
    }
}

fn config() -> OptimizeConfig {
    OptimizeConfig::from_json_str(
        r#"{
            "optimize_results": "optimize_results.csv",
            "output_col": "energy",
            "final_output": "data/out",
            "test_directory": "test/testdata",
            "train_data": "train.csv",
            "optimize_versions_folder": "data/out/output_optsets",
            "optimize_options": {
                "temperature_column": "supply_temp",
                "temperature_values": [1, 2],
                "airflow_column": "airflow",
                "airflow_values": [0, 5]
            },
            "optimization_room_min": 0,
            "optimization_room_avgmin": 3
        }"#,
    )
    .expect("valid config")
}

fn dataset() -> Dataset {
    let features = FeatureTable::new(vec![
        ("supply_temp".to_string(), vec![20.0, 0.5, 18.0, 22.0]),
        ("airflow".to_string(), vec![10.0, 2.0, 6.0, 20.0]),
        ("hour".to_string(), vec![1.0, 7.0, 13.0, 19.0]),
    ])
    .expect("valid table");
    // Target equals the original airflow, so differences measure the reduction.
    Dataset::new(features, "energy", vec![10.0, 2.0, 6.0, 20.0]).expect("valid dataset")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

fn artifact_count(dir: &Path) -> Result<usize> {
    Ok(std::fs::read_dir(dir)?.count())
}

#[test]
fn test_grid_order_and_statistics() -> Result<()> {
    let dir = tempdir()?;
    let model = AirflowEcho::new();
    let data = dataset();

    let results = optimize_model(dir.path(), &config(), RunMode::Train, &model, Some(&data))?;

    assert_eq!(results.len(), 12);
    assert_eq!(model.calls.get(), 12);

    let order: Vec<(f64, f64, Variant)> = results
        .iter()
        .map(|r| (r.temp_decrease, r.air_decrease, r.variant))
        .collect();
    let mut expected = Vec::new();
    for a in [0.0, 5.0] {
        for t in [1.0, 2.0] {
            for v in Variant::ALL {
                expected.push((t, a, v));
            }
        }
    }
    assert_eq!(order, expected);

    for row in results.iter() {
        let expected_fraction = match (row.air_decrease as i64, row.variant) {
            (0, _) => 0.0,
            (5, Variant::OccupiedHigh) => 0.5,
            (5, _) => 0.25,
            _ => unreachable!(),
        };
        assert_eq!(row.boundary_fraction, expected_fraction, "{row:?}");
    }

    // a = 0: prediction equals truth
    for row in results.iter().filter(|r| r.air_decrease == 0.0) {
        assert_eq!(row.mean_difference, 0.0);
        assert_eq!(row.min_difference, 0.0);
        assert_eq!(row.max_difference, 0.0);
    }

    // a = 5, occupied_low: airflow [5, 0, 1, 15] -> diffs [5, 2, 5, 5]
    let low = &results.rows[6];
    assert_eq!(low.variant, Variant::OccupiedLow);
    assert!(close(low.mean_difference, 4.25));
    assert!(close(low.median_difference, 5.0));
    assert!(close(low.min_difference, 2.0));
    assert!(close(low.max_difference, 5.0));

    // a = 5, occupied_high: airflow [5, 3, 3, 15] -> diffs [5, -1, 3, 5]
    let high = &results.rows[7];
    assert_eq!(high.variant, Variant::OccupiedHigh);
    assert!(close(high.mean_difference, 3.0));
    assert!(close(high.median_difference, 4.0));
    assert!(close(high.min_difference, -1.0));
    assert!(close(high.max_difference, 5.0));

    Ok(())
}

#[test]
fn test_artifacts_are_written_per_scenario() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config();
    let data = dataset();
    optimize_model(dir.path(), &cfg, RunMode::Train, &AirflowEcho::new(), Some(&data))?;

    let artifacts = dir.path().join("data/out/output_optsets");
    assert_eq!(artifact_count(&artifacts)?, 12);
    assert!(dir.path().join("data/out/optimize_results.csv").is_file());

    let high = read_feature_table(&artifacts.join("optimize_t2_a5_occupied_high.csv"))?;
    let unoccupied = read_feature_table(&artifacts.join("optimize_t2_a5_unoccupied.csv"))?;

    // target column is not part of the artifact
    assert_eq!(high.names(), data.features.names());
    assert_eq!(high.column("airflow")?, &[5.0, 3.0, 3.0, 15.0]);
    assert_eq!(unoccupied.column("airflow")?, &[5.0, 0.0, 1.0, 15.0]);
    assert_eq!(high.column("supply_temp")?, &[18.0, 0.0, 16.0, 20.0]);
    assert_eq!(high.column("hour")?, data.features.column("hour")?);
    Ok(())
}

#[test]
fn test_fractional_temperatures_get_distinct_artifacts() -> Result<()> {
    let dir = tempdir()?;
    let mut cfg = config();
    cfg.optimize_options.temperature_values = vec![1.5, 15.0];
    cfg.optimize_options.airflow_values = vec![5.0];

    let data = dataset();
    let results = optimize_model(dir.path(), &cfg, RunMode::Train, &AirflowEcho::new(), Some(&data))?;

    let artifacts = dir.path().join("data/out/output_optsets");
    assert_eq!(results.len(), 6);
    assert_eq!(artifact_count(&artifacts)?, results.len());
    assert!(artifacts.join("optimize_t15_a5_occupied_low.csv").is_file());
    assert!(artifacts.join("optimize_t150_a5_occupied_low.csv").is_file());
    Ok(())
}

#[test]
fn test_cached_summary_is_returned_without_predicting() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config();
    let data = dataset();

    let first = optimize_model(dir.path(), &cfg, RunMode::Train, &AirflowEcho::new(), Some(&data))?;

    let model = AirflowEcho::new();
    let second = optimize_model(dir.path(), &cfg, RunMode::Train, &model, None)?;

    assert_eq!(model.calls.get(), 0);
    assert_eq!(second, first);
    Ok(())
}

#[test]
fn test_cache_ignores_requested_grid() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config();
    let data = dataset();
    let first = optimize_model(dir.path(), &cfg, RunMode::Train, &AirflowEcho::new(), Some(&data))?;

    let mut other_grid = cfg.clone();
    other_grid.optimize_options.temperature_values = vec![3.0];
    let second = optimize_model(
        dir.path(),
        &other_grid,
        RunMode::Train,
        &AirflowEcho::new(),
        Some(&data),
    )?;
    assert_eq!(second, first);

    ResultStore::clean(dir.path(), &cfg)?;
    let third = optimize_model(
        dir.path(),
        &other_grid,
        RunMode::Train,
        &AirflowEcho::new(),
        Some(&data),
    )?;
    assert_eq!(third.len(), 6);
    Ok(())
}

#[test]
fn test_missing_source_table_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let err = optimize_model(dir.path(), &config(), RunMode::Train, &AirflowEcho::new(), None)
        .unwrap_err();

    match err {
        Error::MissingUpstream { stage, path } => {
            assert_eq!(stage, "features");
            assert!(path.ends_with("data/out/train.csv"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // the artifacts directory is still created on entry
    assert!(dir.path().join("data/out/output_optsets").is_dir());
    Ok(())
}

#[test]
fn test_source_table_read_from_destination() -> Result<()> {
    let dir = tempdir()?;
    let destination = dir.path().join("test/testdata");
    std::fs::create_dir_all(&destination)?;
    write_dataset(&destination.join("train.csv"), &dataset())?;

    let model = AirflowEcho::new();
    let results = optimize_model(dir.path(), &config(), RunMode::Evaluate, &model, None)?;

    assert_eq!(results.len(), 12);
    assert!(destination.join("optimize_results.csv").is_file());
    assert!(!dir.path().join("data/out/optimize_results.csv").exists());
    Ok(())
}

#[test]
fn test_missing_swept_column() -> Result<()> {
    let dir = tempdir()?;
    let features = FeatureTable::new(vec![("supply_temp".to_string(), vec![1.0, 2.0])])?;
    let data = Dataset::new(features, "energy", vec![1.0, 2.0])?;

    let err = optimize_model(dir.path(), &config(), RunMode::Train, &AirflowEcho::new(), Some(&data))
        .unwrap_err();
    assert!(matches!(err, Error::MissingColumn { column } if column == "airflow"));
    Ok(())
}

#[test]
fn test_short_prediction_is_rejected() -> Result<()> {
    struct Truncating;
    impl Predictor for Truncating {
        fn predict(&self, features: &FeatureTable) -> setpoint_sweep::Result<Vec<f64>> {
            Ok(vec![0.0; features.row_count() - 1])
        }
    }

    let dir = tempdir()?;
    let err = optimize_model(dir.path(), &config(), RunMode::Train, &Truncating, Some(&dataset()))
        .unwrap_err();
    assert!(matches!(err, Error::LengthMismatch { expected: 4, actual: 3 }));
    assert!(!dir.path().join("data/out/optimize_results.csv").exists());
    Ok(())
}

#[test]
fn test_fitted_tree_sweep_is_deterministic() -> Result<()> {
    let cfg = config();
    let data = dataset();
    let params = DecisionTreeRegressor::with_max_depth(3);

    let first_dir = tempdir()?;
    let second_dir = tempdir()?;
    let first = fit_and_optimize(first_dir.path(), &cfg, RunMode::Train, &params, Some(&data))?;
    let second = fit_and_optimize(second_dir.path(), &cfg, RunMode::Train, &params, Some(&data))?;

    assert_eq!(first.len(), 12);
    assert_eq!(first, second);
    for row in first.iter() {
        assert!((0.0..=1.0).contains(&row.boundary_fraction));
        assert!(row.min_difference <= row.median_difference);
        assert!(row.median_difference <= row.max_difference);
    }
    Ok(())
}
