// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{VidfixError, VidfixResult};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "vidfix.toml";

/// Upper bound for `header_scan_bytes`; the header is read into memory
pub const MAX_HEADER_SCAN_BYTES: usize = 64 * 1024 * 1024;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub detection: DetectionConfig,
    pub encoding: EncodingConfig,
    pub tools: ToolsConfig,
    pub logging: LoggingConfig,
}

/// Thresholds of the analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Noise tolerance of the freeze filter in dB
    pub freeze_noise_db: f64,
    /// Minimum static time the filter reports
    pub freeze_min_detect_secs: f64,
    /// Reported freezes shorter than this are kept in the output
    pub freeze_min_keep_secs: f64,
    /// Gaps between freezes shorter than this are dropped
    pub segment_tolerance_secs: f64,
    pub freeze_timeout_secs: u64,
    pub error_scan_timeout_secs: u64,
    /// Leading bytes inspected for `moov`/`mdat`
    pub header_scan_bytes: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            freeze_noise_db: -60.0,
            freeze_min_detect_secs: 2.5,
            freeze_min_keep_secs: 3.0,
            segment_tolerance_secs: 0.5,
            freeze_timeout_secs: 60,
            error_scan_timeout_secs: 30,
            header_scan_bytes: 1024 * 1024,
        }
    }
}

impl DetectionConfig {
    pub fn freeze_timeout(&self) -> Duration {
        Duration::from_secs(self.freeze_timeout_secs)
    }

    pub fn error_scan_timeout(&self) -> Duration {
        Duration::from_secs(self.error_scan_timeout_secs)
    }
}

/// Encoder parameters for the standardizing re-encode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub video_codec: String,
    pub preset: String,
    /// Preset of the light pass
    pub light_preset: String,
    pub crf: u8,
    pub profile: String,
    pub level: String,
    pub pix_fmt: String,
    pub gop_size: u32,
    pub keyint_min: u32,
    pub b_frames: u32,
    pub ref_frames: u32,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub audio_sample_rate: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            light_preset: "fast".to_string(),
            crf: 23,
            profile: "high".to_string(),
            level: "4.0".to_string(),
            pix_fmt: "yuv420p".to_string(),
            gop_size: 30,
            keyint_min: 15,
            b_frames: 2,
            ref_frames: 3,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            audio_sample_rate: 44100,
        }
    }
}

/// Locations of the external binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> VidfixResult<RepairConfig> {
        toml::from_str(content).map_err(|e| VidfixError::ConfigError {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> VidfixResult<RepairConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| VidfixError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize a configuration, e.g. to seed a config file
    pub fn to_toml_string(config: &RepairConfig) -> VidfixResult<String> {
        toml::to_string_pretty(config).map_err(|e| VidfixError::ConfigError {
            message: format!("Failed to serialize config: {}", e),
        })
    }

    /// Validate value ranges
    pub fn validate(config: &RepairConfig) -> VidfixResult<()> {
        let bad = |message: String| Err(VidfixError::ConfigError { message });

        if config.encoding.crf > 51 {
            return bad(format!("CRF value {} cannot exceed 51", config.encoding.crf));
        }
        if config.detection.segment_tolerance_secs < 0.0 {
            return bad("segment_tolerance_secs cannot be negative".to_string());
        }
        if config.detection.freeze_min_keep_secs < 0.0 {
            return bad("freeze_min_keep_secs cannot be negative".to_string());
        }
        if config.detection.freeze_timeout_secs == 0 || config.detection.error_scan_timeout_secs == 0
        {
            return bad("detection timeouts must be positive".to_string());
        }
        if config.detection.header_scan_bytes < 8 {
            return bad("header_scan_bytes must be at least 8".to_string());
        }
        if config.detection.header_scan_bytes > MAX_HEADER_SCAN_BYTES {
            return bad(format!(
                "header_scan_bytes cannot exceed {}",
                MAX_HEADER_SCAN_BYTES
            ));
        }
        if tracing::Level::from_str(&config.logging.level).is_err() {
            return bad(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                config.logging.level
            ));
        }
        Ok(())
    }
}
