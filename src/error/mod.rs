//! Error handling module for vidfix

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for vidfix operations
#[derive(Error, Debug)]
pub enum VidfixError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {}", path.display())]
    InputFileNotFound { path: PathBuf },

    /// External tool could not be started
    #[error("Failed to launch {tool}: {message}")]
    ToolLaunch { tool: String, message: String },

    /// Time-bounded external invocation ran out of time
    #[error("{tool} did not finish within {}s", timeout.as_secs())]
    ToolTimeout { tool: String, timeout: Duration },

    /// Media probe error
    #[error("Failed to probe media file: {message}")]
    ProbeError { message: String },

    /// A processing stage did not produce its output file
    #[error("Stage '{stage}' produced no output at {}", path.display())]
    StageOutputMissing { stage: String, path: PathBuf },

    /// Every part of the video was classified as frozen
    #[error("No valid segments remain after removing frozen sections")]
    NoValidSegments,

    /// No keep-segment could be extracted from the input
    #[error("No segment could be extracted")]
    NoSegmentsExtracted,

    /// The user interrupted the repair
    #[error("Interrupted")]
    Interrupted,

    /// Configuration loading or validation error
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for vidfix operations
pub type VidfixResult<T> = std::result::Result<T, VidfixError>;
