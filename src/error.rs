//! Domain error type. Pipeline and IO functions return `anyhow::Result`; these
//! variants travel inside it and can be recovered with `downcast_ref`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("backend {backend} returned unrecognized label {label:?} (expected one of {expected:?})")]
    UnknownLabel {
        backend: String,
        label: String,
        expected: Vec<String>,
    },

    #[error("backend {backend} declares labels {declared:?} but the label table maps {table:?}")]
    LabelSetMismatch {
        backend: String,
        declared: Vec<String>,
        table: Vec<String>,
    },

    #[error("accelerator unavailable: {0}")]
    AcceleratorUnavailable(String),

    #[error("inference backend error: {0}")]
    Backend(String),

    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {got} labels for {sent} inputs")]
    LabelCountMismatch { sent: usize, got: usize },

    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("trajectory is not strictly ascending at {0}")]
    UnsortedTrajectory(String),

    #[error("trajectory value for {date} is not finite ({value})")]
    NonFiniteValue { date: String, value: f64 },

    #[error("cannot merge {incoming} results into a {existing} result")]
    KindMismatch { existing: String, incoming: String },

    #[error("timestamp {0} is outside the supported calendar range")]
    TimestampOutOfRange(i64),
}
