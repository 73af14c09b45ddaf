//! vidfix - MP4 repair CLI
//!
//! Analyzes an MP4 file for frozen sections, container layout problems,
//! timestamp anomalies and player incompatibilities, then repairs it with
//! ffmpeg using the least invasive strategy that fixes what was found.
//!
//! # Usage
//!
//! ```bash
//! vidfix lecture.mp4
//! vidfix lecture.mp4 repaired.mp4 --yes --crf 20
//! ```

use anyhow::Result;
use clap::Parser;

use vidfix::cli::{commands, Cli};
use vidfix::config_initialization::initialize_configuration;
use vidfix::utils::logging::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli.overrides())?;
    init_logging(&config.logging);

    commands::repair(&cli, &config).await
}
