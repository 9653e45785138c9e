//! CSV tables.
//!
//! Feature tables are plain CSV files with a header row and one numeric value
//! per cell. No index column is read or written.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{Error, Result};
use crate::table::{Dataset, FeatureTable};

/// Reads a CSV file into named numeric columns, in file order.
fn read_columns(path: &Path) -> Result<Vec<(String, Vec<f64>)>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

    for (row_idx, record) in rdr.records().enumerate() {
        let record = record?;
        for (col_idx, header) in headers.iter().enumerate() {
            let raw = record.get(col_idx).unwrap_or("").trim();
            let value: f64 = raw.parse().map_err(|_| Error::Parse {
                path: path.to_path_buf(),
                // 1-based, counting the header line
                row: row_idx + 2,
                column: header.clone(),
                value: raw.to_string(),
            })?;
            columns[col_idx].push(value);
        }
    }

    Ok(headers.into_iter().zip(columns).collect())
}

/// Reads a feature table. Every column is treated as a feature.
pub fn read_feature_table(path: &Path) -> Result<FeatureTable> {
    FeatureTable::new(read_columns(path)?)
}

/// Reads a table and splits out the target column named `target`.
pub fn read_dataset(path: &Path, target: &str) -> Result<Dataset> {
    let mut columns = read_columns(path)?;
    let pos = columns
        .iter()
        .position(|(name, _)| name == target)
        .ok_or_else(|| Error::MissingColumn {
            column: target.to_string(),
        })?;
    let (_, target_values) = columns.remove(pos);
    Dataset::new(FeatureTable::new(columns)?, target, target_values)
}

/// Writes a feature table with a header row.
pub fn write_feature_table(path: &Path, table: &FeatureTable) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut wtr = WriterBuilder::new().from_writer(BufWriter::new(file));

    wtr.write_record(table.names())?;
    let mut record: Vec<String> = Vec::with_capacity(table.column_count());
    for row in 0..table.row_count() {
        record.clear();
        record.extend((0..table.column_count()).map(|c| table.column_at(c)[row].to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Writes a dataset, target column last.
pub fn write_dataset(path: &Path, data: &Dataset) -> Result<()> {
    let mut columns: Vec<(String, Vec<f64>)> = data
        .features
        .names()
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), data.features.column_at(i).to_vec()))
        .collect();
    columns.push((data.target_name.clone(), data.target.clone()));
    write_feature_table(path, &FeatureTable::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_dataset_splits_target() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("train.csv");
        std::fs::write(&path, "temp,energy,air\n20,1.5,10\n21.5,2,12\n")?;

        let data = read_dataset(&path, "energy")?;
        assert_eq!(data.features.names(), &["temp".to_string(), "air".to_string()]);
        assert_eq!(data.target, vec![1.5, 2.0]);
        assert_eq!(data.features.column("temp")?, &[20.0, 21.5]);
        Ok(())
    }

    #[test]
    fn test_missing_target_column() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("train.csv");
        std::fs::write(&path, "temp,air\n20,10\n")?;

        let err = read_dataset(&path, "energy").unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column } if column == "energy"));
        Ok(())
    }

    #[test]
    fn test_non_numeric_cell_reports_position() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "temp,air\n20,10\n21,high\n")?;

        let err = read_feature_table(&path).unwrap_err();
        match err {
            Error::Parse { row, column, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(column, "air");
                assert_eq!(value, "high");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_feature_table(Path::new("/nonexistent/optimize.csv")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_write_then_read_feature_table() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.csv");
        let table = FeatureTable::new(vec![
            ("temp".to_string(), vec![19.0, 0.0]),
            ("air".to_string(), vec![2.5, 7.0]),
        ])?;
        write_feature_table(&path, &table)?;

        assert_eq!(std::fs::read_to_string(&path)?, "temp,air\n19,2.5\n0,7\n");
        assert_eq!(read_feature_table(&path)?, table);
        Ok(())
    }
}
