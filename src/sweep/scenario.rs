use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::OptimizeOptions;

/// Policy shape applied to the airflow column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Occupied space, airflow floored at `optimization_room_min`.
    OccupiedLow,
    /// Occupied space, airflow floored at `optimization_room_avgmin`.
    OccupiedHigh,
    /// Unoccupied space, airflow floored at 0.
    Unoccupied,
}

impl Variant {
    /// Fixed evaluation order within one (t, a) pair.
    pub const ALL: [Variant; 3] = [Variant::OccupiedLow, Variant::OccupiedHigh, Variant::Unoccupied];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::OccupiedLow => "occupied_low",
            Variant::OccupiedHigh => "occupied_high",
            Variant::Unoccupied => "unoccupied",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (temperature decrement, airflow decrement, variant) combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    pub temp_decrease: f64,
    pub air_decrease: f64,
    pub variant: Variant,
}

/// The cross product of the two decrement lists and the three variants.
///
/// Iteration order: airflow values (outer, list order), temperature values
/// (inner, list order), then [`Variant::ALL`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSpace {
    temperature_values: Vec<f64>,
    airflow_values: Vec<f64>,
}

impl ScenarioSpace {
    pub fn new(temperature_values: Vec<f64>, airflow_values: Vec<f64>) -> Self {
        Self {
            temperature_values,
            airflow_values,
        }
    }

    pub fn from_options(options: &OptimizeOptions) -> Self {
        Self::new(
            options.temperature_values.clone(),
            options.airflow_values.clone(),
        )
    }

    pub fn len(&self) -> usize {
        self.temperature_values.len() * self.airflow_values.len() * Variant::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Scenario> + '_ {
        self.airflow_values.iter().flat_map(move |&a| {
            self.temperature_values.iter().flat_map(move |&t| {
                Variant::ALL.into_iter().map(move |variant| Scenario {
                    temp_decrease: t,
                    air_decrease: a,
                    variant,
                })
            })
        })
    }
}
