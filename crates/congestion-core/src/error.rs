use thiserror::Error;

/// All errors produced by the congestion dashboard crates.
#[derive(Error, Debug)]
pub enum CongestionError {
    /// A named data source could not be read.
    #[error("Failed to read data source {name}: {source}")]
    SourceRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A data source was read but produced no valid records.
    #[error("Data source {name} contains no valid records")]
    EmptyDataset { name: String },

    /// A date string did not match the `%Y-%m-%d` ingestion format.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Pass-through for any raw I/O error that does not carry a source name.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the congestion crates.
pub type Result<T> = std::result::Result<T, CongestionError>;
