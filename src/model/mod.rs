//! Predictive models.
//!
//! The sweep only needs something that can score a feature table
//! ([`Predictor`]). Fitting is a separate, earlier step ([`Regressor`]) so that
//! a model is trained once on untransformed data and then only queried.

pub mod tree;

use crate::error::Result;
use crate::table::{Dataset, FeatureTable};

pub use tree::{DecisionTreeRegressor, FittedTree};

/// A fitted model that maps each row of a feature table to one prediction.
pub trait Predictor {
    /// Returns one prediction per row, in row order.
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        (**self).predict(features)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        (**self).predict(features)
    }
}

/// Training parameters for a model type.
pub trait Regressor {
    type Model: Predictor;

    /// Fits a model on `data.features` against `data.target`.
    fn fit(&self, data: &Dataset) -> Result<Self::Model>;
}
