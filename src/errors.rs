use thiserror::Error;

/// Everything that can abort the sparsification pass.
///
/// All variants are fatal: the pass is a single deterministic sweep with no
/// transient dependency to retry against, and a partially written output
/// file is invalid rather than resumable.
#[derive(Debug, Error)]
pub enum SparsifyError {
    /// A required field is missing or empty in an input record.
    #[error("row {row}: missing or malformed field '{field}'")]
    Schema { row: u64, field: String },

    /// The timestamp string does not match the configured format.
    #[error("row {row}: timestamp '{value}' does not match format '{format}'")]
    TimestampParse {
        row: u64,
        value: String,
        format: String,
    },

    /// Raised at configuration time, before any row is read.
    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Coordinates outside the domain of the distance metric.
    /// Policy: fatal for the whole pass, never skip-and-warn.
    #[error("row {row}: coordinates outside metric domain: lat={latitude}, lon={longitude}")]
    MetricDomain {
        row: u64,
        latitude: f64,
        longitude: f64,
    },

    /// The input precondition (non-decreasing timestamps) is violated.
    /// Failing fast here beats silently emitting an under-connected matrix.
    #[error("row {row}: timestamp decreases relative to the previous row; input must be sorted")]
    UnsortedInput { row: u64 },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
