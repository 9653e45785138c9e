pub mod config;
mod error;
pub mod io;
pub mod model;
pub mod sweep;
pub mod table;

// Prelude
pub use config::{OptimizeConfig, OptimizeOptions, RunMode};
pub use error::{Error, Result};
pub use model::{DecisionTreeRegressor, FittedTree, Predictor, Regressor};
pub use sweep::{ResultRow, ResultSet, Scenario, Variant, fit_and_optimize, optimize_model};
pub use table::{Dataset, FeatureTable};
