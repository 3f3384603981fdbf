//! Error types for the scanlayer library.
//!
//! Only job-fatal conditions are errors. Geometry and text edge cases
//! (missing boxes, degenerate heights, empty lines) degrade to defined
//! fallback values and never propagate as errors.

/// Result type alias for scanlayer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types surfaced to callers of the processing pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input file unreadable, empty, over the size limit, or failing
    /// structural pre-validation. Fatal, not retryable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The OCR engine did not complete within the bounded polling window.
    /// The caller may retry the whole job.
    #[error("OCR engine timed out after {attempts} polls ({waited_ms} ms)")]
    OcrTimeout {
        /// Number of polls performed before giving up
        attempts: u32,
        /// Total wall-clock time spent waiting, in milliseconds
        waited_ms: u64,
    },

    /// The OCR engine reported a failure status. Not retried automatically.
    #[error("OCR engine failure: {0}")]
    OcrEngineFailure(String),

    /// Internal invariant violation (e.g. the terminal synthesis tier
    /// produced an invalid document, which is structurally impossible).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// OCR wire payload could not be deserialized
    #[error("OCR payload error: {0}")]
    Json(#[from] serde_json::Error),
}
