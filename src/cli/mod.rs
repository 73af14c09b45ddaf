//! CLI module for vidfix
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

use crate::config_initialization::CliOverrides;

pub mod commands;

/// vidfix - MP4 repair tool
///
/// Removes frozen sections, repairs the container layout and standardizes
/// the encoding of MP4 files that play fine online but stutter locally.
#[derive(Parser, Debug)]
#[command(name = "vidfix")]
#[command(about = "Analyze and repair MP4 files with frozen sections or playback stutter")]
#[command(version)]
pub struct Cli {
    /// Input MP4 file
    pub input: PathBuf,

    /// Output file (default: <name>_fixed.<ext> next to the input)
    pub output: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Configuration file (default: ./vidfix.toml when present)
    #[arg(long, env = "VIDFIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Constant Rate Factor for re-encodes (0-51)
    #[arg(long, value_parser = parse_crf)]
    pub crf: Option<u8>,

    /// x264 preset for the standardizing re-encode
    #[arg(long)]
    pub preset: Option<String>,
}

fn parse_crf(s: &str) -> Result<u8, String> {
    clap_num::number_range(s, 0, 51)
}

impl Cli {
    /// Flags that take part in configuration layering
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_file: self.config.clone(),
            log_level: self.log_level.clone(),
            crf: self.crf,
            preset: self.preset.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_and_flags() {
        let cli = Cli::try_parse_from(["vidfix", "in.mp4", "out.mp4", "-y", "--crf", "20"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("in.mp4"));
        assert_eq!(cli.output, Some(PathBuf::from("out.mp4")));
        assert!(cli.yes);

        let overrides = cli.overrides();
        assert_eq!(overrides.crf, Some(20));
        assert_eq!(overrides.preset, None);
    }

    #[test]
    fn test_crf_range_is_enforced() {
        assert!(Cli::try_parse_from(["vidfix", "in.mp4", "--crf", "52"]).is_err());
        assert!(Cli::try_parse_from(["vidfix", "in.mp4", "--crf", "0"]).is_ok());
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["vidfix"]).is_err());
    }
}
