use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::error::Result;

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let data = fs::read_to_string(file_path)?;
    let parsed_data: T = serde_json::from_str(&data)?;

    Ok(parsed_data)
}

/// Parses every row of a headed CSV file into `T`.
pub fn parse_csv_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<Vec<T>> {
    let file = File::open(file_path)?;
    parse_csv_reader(file)
}

/// Parses every row of headed CSV data into `T`.
///
/// Surrounding whitespace in fields is trimmed so hand-written manifests
/// with `a, b, c` spacing still parse.
pub fn parse_csv_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<T>() {
        rows.push(record?);
    }

    Ok(rows)
}
