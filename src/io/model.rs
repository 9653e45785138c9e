//! JSON persistence of fitted models.
//!
//! Training and evaluation run as separate steps; the fitted tree is written
//! once by the training step and read back by every evaluation.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::FittedTree;

/// Writes a fitted tree to a JSON file.
pub fn write_model(path: &Path, model: &FittedTree) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), model)?;
    Ok(())
}

/// Reads a fitted tree from a JSON file and checks its structure.
pub fn read_model(path: &Path) -> Result<FittedTree> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let model: FittedTree = serde_json::from_reader(BufReader::new(file))?;
    model.validate()?;
    Ok(model)
}
