//! File I/O for feature tables and fitted models.

pub mod model;
pub mod tables;

pub use model::{read_model, write_model};
pub use tables::{read_dataset, read_feature_table, write_dataset, write_feature_table};
