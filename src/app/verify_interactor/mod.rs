// Verify interactor - Inspects the repaired output

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::model::AnalysisReport;
use crate::domain::rules::{SegmentCalculator, STANDARD_PIX_FMT};
use crate::error::{VidfixError, VidfixResult};
use crate::ports::*;
use crate::utils::format_megabytes;
use crate::utils::time::format_span;

/// Stream durations closer than this play in sync
pub const SYNC_TOLERANCE_SECS: f64 = 0.5;
/// Output duration within this of the expectation is complete
pub const INTEGRITY_OK_SECS: f64 = 5.0;
/// Beyond this the difference is reported as large
pub const INTEGRITY_MINOR_SECS: f64 = 30.0;

/// Relation of the output's video and audio stream durations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncStatus {
    InSync,
    VideoLonger(f64),
    AudioLonger(f64),
}

impl SyncStatus {
    pub fn classify(video: f64, audio: f64) -> Self {
        let diff = video - audio;
        if diff.abs() < SYNC_TOLERANCE_SECS {
            SyncStatus::InSync
        } else if diff > 0.0 {
            SyncStatus::VideoLonger(diff)
        } else {
            SyncStatus::AudioLonger(-diff)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    Complete,
    MinorDifference,
    LargeDifference,
}

impl IntegrityStatus {
    pub fn classify(expected: f64, actual: f64) -> Self {
        let diff = (actual - expected).abs();
        if diff < INTEGRITY_OK_SECS {
            IntegrityStatus::Complete
        } else if diff < INTEGRITY_MINOR_SECS {
            IntegrityStatus::MinorDifference
        } else {
            IntegrityStatus::LargeDifference
        }
    }
}

/// Expected versus actual output duration
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityCheck {
    pub original: f64,
    pub removed: f64,
    pub actual: Option<f64>,
}

impl IntegrityCheck {
    pub fn expected(&self) -> f64 {
        self.original - self.removed
    }

    pub fn status(&self) -> Option<IntegrityStatus> {
        self.actual
            .map(|actual| IntegrityStatus::classify(self.expected(), actual))
    }
}

/// Everything learned about the output; sections whose probe failed are `None`
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub output: PathBuf,
    pub size_bytes: u64,
    pub video_duration: Option<f64>,
    pub audio_duration: Option<f64>,
    pub video_codec: Option<String>,
    pub video_profile: Option<String>,
    pub pix_fmt: Option<String>,
    pub integrity: IntegrityCheck,
}

impl VerificationReport {
    /// Combine the probe of the output with the analysis of the input
    pub fn build(
        output: &Path,
        size_bytes: u64,
        probe: Option<&ProbeReport>,
        analysis: &AnalysisReport,
    ) -> Self {
        let video = probe.and_then(|p| p.first_of("video"));
        Self {
            output: output.to_path_buf(),
            size_bytes,
            video_duration: probe.and_then(|p| p.duration_of("video")),
            audio_duration: probe.and_then(|p| p.duration_of("audio")),
            video_codec: video.and_then(|v| v.codec_name.clone()),
            video_profile: video.and_then(|v| v.profile.clone()),
            pix_fmt: video.and_then(|v| v.pix_fmt.clone()),
            integrity: IntegrityCheck {
                original: analysis.media.duration,
                removed: SegmentCalculator::frozen_coverage(&analysis.issues.freezes),
                actual: probe.and_then(|p| p.format_duration),
            },
        }
    }

    pub fn sync(&self) -> Option<SyncStatus> {
        match (self.video_duration, self.audio_duration) {
            (Some(video), Some(audio)) if video > 0.0 && audio > 0.0 => {
                Some(SyncStatus::classify(video, audio))
            }
            _ => None,
        }
    }

    pub fn has_standard_pix_fmt(&self) -> bool {
        self.pix_fmt.as_deref() == Some(STANDARD_PIX_FMT)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output.display().to_string());
        writeln!(f, "Output file: {}", name)?;
        writeln!(f, "File size: {}", format_megabytes(self.size_bytes))?;

        if self.video_duration.is_some() || self.audio_duration.is_some() {
            writeln!(f, "\nFinal stream durations:")?;
            if let Some(video) = self.video_duration {
                writeln!(f, "  Video: {}", format_span(video))?;
            }
            if let Some(audio) = self.audio_duration {
                writeln!(f, "  Audio: {}", format_span(audio))?;
            }
            match self.sync() {
                Some(SyncStatus::InSync) => {
                    writeln!(f, "\n  Video and audio durations match, playback should be in sync")?
                }
                Some(SyncStatus::VideoLonger(d)) => {
                    writeln!(f, "\n  Video is {:.1}s longer than audio", d)?
                }
                Some(SyncStatus::AudioLonger(d)) => {
                    writeln!(f, "\n  Audio is {:.1}s longer than video", d)?
                }
                None => {}
            }
        } else {
            writeln!(f, "\n  Warning: stream durations unavailable")?;
        }

        if let Some(codec) = &self.video_codec {
            writeln!(f, "\nVideo parameters:")?;
            writeln!(f, "  Codec: {}", codec)?;
            writeln!(f, "  Profile: {}", self.video_profile.as_deref().unwrap_or("unknown"))?;
            writeln!(f, "  Pixel format: {}", self.pix_fmt.as_deref().unwrap_or("unknown"))?;
            if self.has_standard_pix_fmt() {
                writeln!(f, "  Pixel format standardized")?;
            }
        }

        let integrity = &self.integrity;
        writeln!(f, "\nIntegrity check:")?;
        writeln!(f, "  Original: {:.1} min", integrity.original / 60.0)?;
        writeln!(f, "  Removed:  {:.1} min", integrity.removed / 60.0)?;
        writeln!(f, "  Expected: {:.1} min", integrity.expected() / 60.0)?;
        if let (Some(actual), Some(status)) = (integrity.actual, integrity.status()) {
            writeln!(f, "  Actual:   {:.1} min", actual / 60.0)?;
            let verdict = match status {
                IntegrityStatus::Complete => "Data complete, duration as expected",
                IntegrityStatus::MinorDifference => "Duration differs slightly, probably fine",
                IntegrityStatus::LargeDifference => "Duration differs a lot, please check",
            };
            writeln!(f, "  {}", verdict)?;
        }

        writeln!(f, "\nTips:")?;
        writeln!(f, "  - Test playback on different devices and players")?;
        writeln!(f, "  - Check for remaining stutter or freezes")?;
        write!(f, "  - Confirm audio and video stay in sync")
    }
}

/// Interactor for the verification use case
pub struct VerifyInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl VerifyInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Verify the output of a finished repair.
    ///
    /// Only a missing output file is an error; probe failures leave the
    /// affected sections empty.
    pub async fn verify(
        &self,
        output: &Path,
        analysis: &AnalysisReport,
    ) -> VidfixResult<VerificationReport> {
        let metadata = tokio::fs::metadata(output)
            .await
            .map_err(|_| VidfixError::StageOutputMissing {
                stage: "repair".to_string(),
                path: output.to_path_buf(),
            })?;

        let probe = match self.probe_port.probe_report(output).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Could not probe output {}: {}", output.display(), e);
                None
            }
        };

        let report = VerificationReport::build(output, metadata.len(), probe.as_ref(), analysis);
        info!(
            sync = ?report.sync(),
            integrity = ?report.integrity.status(),
            "Verification finished"
        );
        Ok(report)
    }
}
