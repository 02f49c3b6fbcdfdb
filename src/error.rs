use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse workflow JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to read size manifest: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to build workflow graph: {0}")]
    ModelConstructionError(String),

    #[error("Workflow graph is malformed: {0}")]
    MalformedGraph(String),

    #[error("Size manifest declares '{filename}' with two different lengths ({first} and {second})")]
    SizeInconsistency { filename: String, first: u64, second: u64 },

    #[error("No size known for file '{0}'")]
    UnknownFile(String),

    #[error("Storage delta overflowed while summing files of job '{0}'")]
    SizeOverflow(String),
}

pub type Result<T> = std::result::Result<T, Error>;
