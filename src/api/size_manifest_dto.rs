use serde::{Deserialize, Serialize};

/// One row of a size manifest.
///
/// Only `filename` and `length` take part in size lookup; the remaining
/// columns identify which job produced or consumed the file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileSizeRecordDto {
    pub transformation: String,
    pub id: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub filename: String,
    pub length: u64,
}
