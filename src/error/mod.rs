//! Error handling for the cohort extraction and figure pipelines.

use thiserror::Error;

/// Specialized error type for cohort queries and figure generation
#[derive(Debug, Error)]
pub enum CohortError {
    /// The claims table is unreachable or a query against it is malformed.
    /// Fatal to the single cohort computation that raised it; independent
    /// computations are unaffected.
    #[error("data source error: {0}")]
    DataSource(String),

    /// An input CSV lacks a column the figure pipeline expects.
    /// Fatal to that figure's generation only.
    #[error("missing column '{column}' in {table}")]
    MissingColumn {
        /// Logical name of the input table
        table: String,
        /// The absent column header
        column: String,
    },

    /// A figure backend failed to draw or persist an image
    #[error("render error: {0}")]
    Render(String),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from an Arrow compute kernel or batch operation
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error reading Parquet data
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Error parsing a CSV extract
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Error parsing the boundary GeoJSON
    #[error("geojson error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Error parsing the extraction-plan configuration table
    #[error("plan error: {0}")]
    Plan(#[from] serde_json::Error),
}

impl CohortError {
    /// Build a `DataSource` error with a formatted message
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource(message.into())
    }

    /// Build a `MissingColumn` error for a named input table
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Result type for cohort and figure operations
pub type Result<T> = std::result::Result<T, CohortError>;
