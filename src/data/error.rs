use std::path::PathBuf;

use thiserror::Error;

use super::model::Metric;

/// Errors raised by the loading and cleaning pipeline.
///
/// Any of these aborts the run; no partial unified table is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source file missing or unreadable.
    #[error("failed to load {}: {source}", path.display())]
    FileLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A picked path that is neither a data directory nor a Parquet file.
    #[error("Unsupported file extension: .{extension} ({})", path.display())]
    UnsupportedFile { path: PathBuf, extension: String },

    /// Malformed CSV structure in a source file.
    #[error("failed to parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The first header of a wide table is not `country`.
    #[error("table '{table}' has no leading 'country' column (found '{found}')")]
    MissingCountryColumn { table: String, found: String },

    /// A numeric cell could not be parsed.
    #[error("table '{table}', column '{column}', row {row} ({country}): cannot parse '{value}': {reason}")]
    ValueParse {
        table: String,
        column: String,
        row: usize,
        country: String,
        value: String,
        reason: String,
    },

    /// The same (country, year) appeared twice in one metric.
    #[error("duplicate key ({country}, {year}) in {metric} table")]
    DuplicateKey {
        metric: Metric,
        country: String,
        year: i32,
    },

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A Parquet file that does not hold a unified table.
    #[error("{} is not a unified dataset: {reason}", path.display())]
    InvalidCacheFile { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
