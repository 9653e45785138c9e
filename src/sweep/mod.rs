//! Setpoint reduction sweep.
//!
//! Enumerates (temperature decrement, airflow decrement, variant) scenarios,
//! scores each transformed feature table with a fitted model, and stores the
//! per-scenario tables together with a summary of prediction differences.

pub mod optimize;
pub mod result;
pub mod scenario;
pub mod stats;
pub mod store;
pub mod transform;

pub use optimize::{fit_and_optimize, optimize_model};
pub use result::{ResultRow, ResultSet};
pub use scenario::{Scenario, ScenarioSpace, Variant};
pub use stats::DifferenceStats;
pub use store::ResultStore;
pub use transform::{FeatureTransformer, Floors, low_barrier, reduce_setpoint};
