use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset file has no header row")]
    MissingHeader,
}

/// One parsed row: CSV column name to string value, in header order.
pub type DatasetRow = Map<String, Value>;

/// Reads the whole CSV file in one pass. The first non-empty line is the
/// header and names the fields; empty lines are skipped; values are kept as
/// strings with no validation. Either every row is returned or the load
/// fails, never a partial result.
pub fn load(path: &Path) -> Result<Vec<DatasetRow>, DatasetError> {
    let contents = fs::read_to_string(path)?;

    let mut lines = contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header: Vec<&str> = lines
        .next()
        .ok_or(DatasetError::MissingHeader)?
        .split(',')
        .map(str::trim)
        .collect();

    let rows = lines
        .map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            header
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    // Values are passed through untouched; only the header is
                    // normalized.
                    let value = values.get(i).copied().unwrap_or("");
                    (column.to_string(), Value::String(value.to_string()))
                })
                .collect()
        })
        .collect();

    Ok(rows)
}
