//! Error types for the dengue pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Main error type for the dengue pipeline
///
/// Each variant corresponds to one failure class of the batch run. An empty
/// or absent dataset is not represented here: stages model it as `None` plus
/// a warning log, since a snapshot with no usable rows is a normal terminal
/// outcome of a run.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("row {row}: cannot coerce {field} value '{value}' to an integer")]
    Coercion {
        field: String,
        value: String,
        row: usize,
    },

    #[error("Load error: {0}")]
    Load(String),
}

impl EtlError {
    /// Whether this error should fail the process with a nonzero exit
    ///
    /// Configuration and coercion problems abort the run; network, parse,
    /// and load failures are handled at their stage boundary and only
    /// reach the caller through logs and the run report.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EtlError::Config(_) | EtlError::Coercion { .. })
    }
}
