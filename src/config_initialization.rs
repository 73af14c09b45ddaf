//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapters::toml_config::{RepairConfig, TomlConfigAdapter, DEFAULT_CONFIG_FILE};
use crate::error::{VidfixError, VidfixResult};

/// Values given on the command line; `None` leaves lower layers untouched
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub crf: Option<u8>,
    pub preset: Option<String>,
}

/// Build the configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(overrides: &CliOverrides) -> VidfixResult<RepairConfig> {
    let mut config = load_config_file(overrides.config_file.as_deref())?;
    apply_environment(&mut config, |key| std::env::var(key).ok())?;
    apply_cli_overrides(&mut config, overrides);
    TomlConfigAdapter::validate(&config)?;
    Ok(config)
}

/// An explicit file must exist; the default file is optional
fn load_config_file(explicit: Option<&Path>) -> VidfixResult<RepairConfig> {
    if let Some(path) = explicit {
        return TomlConfigAdapter::load(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return TomlConfigAdapter::load(default_path);
    }

    Ok(RepairConfig::default())
}

/// Apply environment variable overrides read through `lookup`
pub fn apply_environment<F>(config: &mut RepairConfig, lookup: F) -> VidfixResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_overrides = 0;

    if let Some(level) = lookup("VIDFIX_LOG_LEVEL") {
        config.logging.level = level;
        env_overrides += 1;
    }
    if let Some(crf) = lookup("VIDFIX_CRF") {
        config.encoding.crf = crf.trim().parse().map_err(|e| VidfixError::ConfigError {
            message: format!("Invalid VIDFIX_CRF value '{}': {}", crf, e),
        })?;
        env_overrides += 1;
    }
    if let Some(preset) = lookup("VIDFIX_PRESET") {
        config.encoding.preset = preset;
        env_overrides += 1;
    }
    if let Some(ffmpeg) = lookup("FFMPEG") {
        config.tools.ffmpeg = PathBuf::from(ffmpeg);
        env_overrides += 1;
    }
    if let Some(ffprobe) = lookup("FFPROBE") {
        config.tools.ffprobe = PathBuf::from(ffprobe);
        env_overrides += 1;
    }

    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut RepairConfig, overrides: &CliOverrides) {
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
    }
    if let Some(crf) = overrides.crf {
        config.encoding.crf = crf;
    }
    if let Some(preset) = &overrides.preset {
        config.encoding.preset = preset.clone();
    }
}
