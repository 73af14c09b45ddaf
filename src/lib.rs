//! vidfix library
//!
//! MP4 analysis and repair built on the external ffmpeg/ffprobe tools.
//! Domain types and rules are pure; the interactors in [`app`] drive the
//! tools through the [`ports`] traits.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{AnalysisReport, MediaInfo, RepairStrategy};
pub use error::{VidfixError, VidfixResult};
