//! Bounded reductions applied to the swept columns.

use super::scenario::{Scenario, Variant};
use crate::error::{Error, Result};
use crate::table::FeatureTable;

/// Subtracts `val` from `x` and clamps the result at `floor`.
///
/// A NaN input stays NaN.
pub fn reduce_setpoint(x: f64, val: f64, floor: f64) -> f64 {
    let reduced = x - val;
    if reduced < floor { floor } else { reduced }
}

/// True when reducing `x` by `val` would fall below `floor`.
pub fn low_barrier(x: f64, val: f64, floor: f64) -> bool {
    x - val < floor
}

/// Airflow floors of the two occupied variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Floors {
    pub room_min: f64,
    pub room_avgmin: f64,
}

impl Floors {
    /// Airflow floor for `variant`.
    pub fn for_variant(&self, variant: Variant) -> f64 {
        match variant {
            Variant::OccupiedLow => self.room_min,
            Variant::OccupiedHigh => self.room_avgmin,
            Variant::Unoccupied => 0.0,
        }
    }
}

/// Builds per-scenario copies of a feature table.
#[derive(Debug, Clone)]
pub struct FeatureTransformer {
    temperature_column: String,
    airflow_column: String,
    floors: Floors,
}

impl FeatureTransformer {
    pub fn new(temperature_column: &str, airflow_column: &str, floors: Floors) -> Self {
        Self {
            temperature_column: temperature_column.to_string(),
            airflow_column: airflow_column.to_string(),
            floors,
        }
    }

    pub fn floors(&self) -> Floors {
        self.floors
    }

    /// Checks that both swept columns exist in `table`.
    pub fn check_columns(&self, table: &FeatureTable) -> Result<()> {
        table.column_index(&self.temperature_column)?;
        table.column_index(&self.airflow_column)?;
        Ok(())
    }

    /// Returns a copy of `original` with the temperature column reduced by
    /// `t` (floor 0) and the airflow column reduced by `a` (variant floor).
    pub fn apply(&self, original: &FeatureTable, scenario: &Scenario) -> Result<FeatureTable> {
        let floor = self.floors.for_variant(scenario.variant);
        let temperature = reduce_column(
            original.column(&self.temperature_column)?,
            scenario.temp_decrease,
            0.0,
        );
        let airflow = reduce_column(
            original.column(&self.airflow_column)?,
            scenario.air_decrease,
            floor,
        );

        let mut out = original.clone();
        out.replace_column(&self.temperature_column, temperature)?;
        out.replace_column(&self.airflow_column, airflow)?;
        Ok(out)
    }

    /// Fraction of rows whose *original* airflow value would be clipped by
    /// the variant's floor when reduced by `a`. Independent of `t`.
    pub fn boundary_fraction(
        &self,
        original: &FeatureTable,
        a: f64,
        variant: Variant,
    ) -> Result<f64> {
        if original.is_empty() {
            return Err(Error::EmptyTable);
        }
        let floor = self.floors.for_variant(variant);
        let clipped = original
            .column(&self.airflow_column)?
            .iter()
            .filter(|&&x| low_barrier(x, a, floor))
            .count();
        Ok(clipped as f64 / original.row_count() as f64)
    }
}

fn reduce_column(values: &[f64], val: f64, floor: f64) -> Vec<f64> {
    values.iter().map(|&x| reduce_setpoint(x, val, floor)).collect()
}
