//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe -print_format json -show_format -show_streams` through the
//! execution port and maps the JSON onto the domain model.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::model::*;
use crate::engine::FfmpegCommands;
use crate::error::{VidfixError, VidfixResult};
use crate::ports::*;

// ffprobe reports numbers as strings, so durations and sizes stay `String`
// until mapped.

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    profile: Option<String>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    size: Option<String>,
}

fn parse_seconds(value: Option<&String>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

impl ProbeOutput {
    fn first_stream(&self, codec_type: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }

    fn format_duration(&self) -> Option<f64> {
        self.format
            .as_ref()
            .and_then(|f| parse_seconds(f.duration.as_ref()))
    }
}

/// Map ffprobe JSON onto `MediaInfo`.
///
/// A missing container duration is an error; stream details fall back to
/// 30 fps and `"unknown"` codec parameters.
pub fn parse_media_info(json: &str) -> VidfixResult<MediaInfo> {
    let output: ProbeOutput = serde_json::from_str(json)?;

    let duration = output.format_duration().ok_or_else(|| VidfixError::ProbeError {
        message: "container duration missing".to_string(),
    })?;
    let size_bytes = output
        .format
        .as_ref()
        .and_then(|f| f.size.as_deref())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);

    let video = output.first_stream("video");
    let audio = output.first_stream("audio");

    let text = |value: Option<&String>| {
        value
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    };

    Ok(MediaInfo {
        duration,
        audio_duration: audio
            .and_then(|a| parse_seconds(a.duration.as_ref()))
            .unwrap_or(duration),
        size_bytes,
        frame_rate: video
            .and_then(|v| v.r_frame_rate.as_deref())
            .map(FrameRate::parse_or_default)
            .unwrap_or_default(),
        codec: text(video.and_then(|v| v.codec_name.as_ref())),
        profile: text(video.and_then(|v| v.profile.as_ref())),
        pix_fmt: text(video.and_then(|v| v.pix_fmt.as_ref())),
        audio_codec: audio.map(|a| text(a.codec_name.as_ref())),
        assumed: false,
    })
}

/// Map ffprobe JSON onto the verification report
pub fn parse_probe_report(json: &str) -> VidfixResult<ProbeReport> {
    let output: ProbeOutput = serde_json::from_str(json)?;

    let streams = output
        .streams
        .iter()
        .filter_map(|s| {
            Some(StreamSummary {
                codec_type: s.codec_type.clone()?,
                codec_name: s.codec_name.clone(),
                profile: s.profile.clone(),
                pix_fmt: s.pix_fmt.clone(),
                duration: parse_seconds(s.duration.as_ref()),
            })
        })
        .collect();

    Ok(ProbeReport {
        format_duration: output.format_duration(),
        streams,
    })
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    executor: Arc<dyn ExecutePort>,
}

impl FFprobeAdapter {
    pub fn new(executor: Arc<dyn ExecutePort>) -> Self {
        Self { executor }
    }

    async fn probe_json(&self, path: &Path) -> VidfixResult<String> {
        let output = self
            .executor
            .capture(&FfmpegCommands::probe(path), None)
            .await?;
        if !output.success {
            return Err(VidfixError::ProbeError {
                message: format!(
                    "ffprobe exited with {:?} for {}",
                    output.exit_code,
                    path.display()
                ),
            });
        }
        debug!("ffprobe returned {} bytes for {}", output.stdout.len(), path.display());
        Ok(output.stdout)
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_media(&self, path: &Path) -> VidfixResult<MediaInfo> {
        parse_media_info(&self.probe_json(path).await?)
    }

    async fn probe_report(&self, path: &Path) -> VidfixResult<ProbeReport> {
        parse_probe_report(&self.probe_json(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "profile": "High 4:4:4 Predictive",
                "codec_type": "video",
                "pix_fmt": "yuv444p",
                "r_frame_rate": "30000/1001",
                "duration": "120.120000"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "profile": "LC",
                "codec_type": "audio",
                "duration": "119.980000"
            }
        ],
        "format": {
            "filename": "in.mp4",
            "duration": "120.150000",
            "size": "52428800"
        }
    }"#;

    #[test]
    fn test_media_info_from_full_probe() {
        let info = parse_media_info(SAMPLE).unwrap();
        assert_eq!(info.duration, 120.15);
        assert_eq!(info.audio_duration, 119.98);
        assert_eq!(info.size_bytes, 52_428_800);
        assert_eq!(info.size_mb(), 50.0);
        assert_eq!(info.frame_rate, FrameRate::new(30000, 1001).unwrap());
        assert_eq!(info.codec, "h264");
        assert_eq!(info.profile, "High 4:4:4 Predictive");
        assert_eq!(info.pix_fmt, "yuv444p");
        assert_eq!(info.audio_codec.as_deref(), Some("aac"));
        assert!(!info.assumed);
    }

    #[test]
    fn test_video_only_file() {
        let json = r#"{
            "streams": [{"codec_type": "video", "codec_name": "h264", "r_frame_rate": "0/0"}],
            "format": {"duration": "10.0"}
        }"#;
        let info = parse_media_info(json).unwrap();
        assert_eq!(info.audio_codec, None);
        assert!(!info.has_audio());
        assert_eq!(info.audio_duration, 10.0);
        assert_eq!(info.frame_rate, FrameRate::default());
        assert_eq!(info.profile, "unknown");
        assert_eq!(info.size_bytes, 0);
    }

    #[test]
    fn test_missing_duration_is_an_error() {
        let json = r#"{"streams": [], "format": {"size": "100"}}"#;
        assert!(matches!(
            parse_media_info(json),
            Err(VidfixError::ProbeError { .. })
        ));
        assert!(matches!(parse_media_info("{}"), Err(VidfixError::ProbeError { .. })));
        assert!(matches!(
            parse_media_info("not json"),
            Err(VidfixError::JsonError(_))
        ));
    }

    #[test]
    fn test_probe_report_stream_durations() {
        let report = parse_probe_report(SAMPLE).unwrap();
        assert_eq!(report.streams.len(), 2);
        assert_eq!(report.duration_of("video"), Some(120.12));
        assert_eq!(report.duration_of("audio"), Some(119.98));
        assert_eq!(report.duration_of("subtitle"), None);
        assert_eq!(
            report.first_of("video").and_then(|s| s.pix_fmt.as_deref()),
            Some("yuv444p")
        );
    }

    #[test]
    fn test_stream_without_duration_uses_container() {
        let json = r#"{
            "streams": [{"codec_type": "video", "codec_name": "h264"}],
            "format": {"duration": "42.5"}
        }"#;
        let report = parse_probe_report(json).unwrap();
        assert_eq!(report.duration_of("video"), Some(42.5));
    }
}
