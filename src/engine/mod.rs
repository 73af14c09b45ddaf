//! Command construction and run-time plumbing shared by the interactors

pub mod commands;
pub mod progress;
pub mod workspace;

pub use commands::{write_concat_list, FfmpegCommands};
pub use workspace::ScratchWorkspace;
