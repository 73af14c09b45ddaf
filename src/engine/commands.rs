//! ffmpeg command lines for every analysis and repair stage

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::adapters::toml_config::{DetectionConfig, EncodingConfig};
use crate::domain::model::{FrameRate, Segment};
use crate::ports::ToolInvocation;

/// Builds the invocations; all encoder choices come from configuration
#[derive(Debug, Clone)]
pub struct FfmpegCommands {
    encoding: EncodingConfig,
    detection: DetectionConfig,
}

impl FfmpegCommands {
    pub fn new(encoding: EncodingConfig, detection: DetectionConfig) -> Self {
        Self { encoding, detection }
    }

    /// Format and stream metadata as JSON
    pub fn probe(input: &Path) -> ToolInvocation {
        ToolInvocation::ffprobe()
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(input)
    }

    /// Decode pass that logs static sections
    pub fn detect_freezes(&self, input: &Path) -> ToolInvocation {
        let filter = format!(
            "freezedetect=n={}dB:d={}",
            self.detection.freeze_noise_db, self.detection.freeze_min_detect_secs
        );
        ToolInvocation::ffmpeg()
            .arg("-i")
            .arg(input)
            .args(["-vf", filter.as_str(), "-f", "null", "-"])
    }

    /// Decode pass that only reports errors
    pub fn scan_errors(&self, input: &Path) -> ToolInvocation {
        ToolInvocation::ffmpeg()
            .args(["-v", "error", "-i"])
            .arg(input)
            .args(["-f", "null", "-"])
    }

    fn audio_args(&self, invocation: ToolInvocation) -> ToolInvocation {
        invocation
            .args(["-c:a", self.encoding.audio_codec.as_str()])
            .args(["-b:a", self.encoding.audio_bitrate.as_str()])
            .arg("-ar")
            .arg(self.encoding.audio_sample_rate.to_string())
    }

    /// Standardizing video settings: fixed GOP, no scene cuts, CFR
    fn standard_video_args(&self, invocation: ToolInvocation) -> ToolInvocation {
        let e = &self.encoding;
        invocation
            .args(["-c:v", e.video_codec.as_str()])
            .args(["-preset", e.preset.as_str()])
            .arg("-crf")
            .arg(e.crf.to_string())
            .args(["-profile:v", e.profile.as_str()])
            .args(["-pix_fmt", e.pix_fmt.as_str()])
            .arg("-g")
            .arg(e.gop_size.to_string())
            .arg("-keyint_min")
            .arg(e.keyint_min.to_string())
            .args(["-sc_threshold", "0"])
            .arg("-bf")
            .arg(e.b_frames.to_string())
    }

    /// Whole audio track re-encoded on its own
    pub fn extract_audio(&self, input: &Path, output: &Path) -> ToolInvocation {
        let invocation = ToolInvocation::ffmpeg().args(["-y", "-i"]).arg(input).arg("-vn");
        self.audio_args(invocation).arg(output)
    }

    /// One keep-segment re-encoded with the standard video settings, no audio
    pub fn encode_segment(&self, input: &Path, segment: &Segment, output: &Path) -> ToolInvocation {
        let invocation = ToolInvocation::ffmpeg()
            .args(["-y", "-ss"])
            .arg(segment.start.to_string())
            .arg("-i")
            .arg(input)
            .arg("-t")
            .arg(segment.duration().to_string());
        self.standard_video_args(invocation)
            .args(["-vsync", "cfr", "-an"])
            .arg(output)
    }

    /// One keep-segment with copied video and, if present, retimed audio
    pub fn copy_segment(
        &self,
        input: &Path,
        segment: &Segment,
        with_audio: bool,
        output: &Path,
    ) -> ToolInvocation {
        let invocation = ToolInvocation::ffmpeg()
            .args(["-y", "-ss"])
            .arg(segment.start.to_string())
            .arg("-i")
            .arg(input)
            .arg("-t")
            .arg(segment.duration().to_string())
            .args(["-c:v", "copy"]);
        let invocation = if with_audio {
            self.audio_args(invocation)
                .args(["-af", "asetpts=PTS-STARTPTS"])
        } else {
            invocation.arg("-an")
        };
        invocation.args(["-fflags", "+genpts"]).arg(output)
    }

    /// Stream-copy concatenation of a concat list
    pub fn concat_copy(&self, list: &Path, output: &Path) -> ToolInvocation {
        ToolInvocation::ffmpeg()
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(list)
            .args(["-c", "copy"])
            .arg(output)
    }

    /// Concatenation with copied video and re-encoded audio for continuous timestamps
    pub fn concat_reencode_audio(&self, list: &Path, output: &Path) -> ToolInvocation {
        let invocation = ToolInvocation::ffmpeg()
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(list)
            .args(["-c:v", "copy"]);
        self.audio_args(invocation)
            .args(["-movflags", "+faststart"])
            .arg(output)
    }

    /// Final mux of the merged video with the full audio track, if any
    pub fn mux(&self, video: &Path, audio: Option<&Path>, output: &Path) -> ToolInvocation {
        let mut invocation = ToolInvocation::ffmpeg().args(["-y", "-i"]).arg(video);
        match audio {
            Some(audio) => {
                invocation = invocation.arg("-i").arg(audio).args(["-c:v", "copy"]);
                invocation = self
                    .audio_args(invocation)
                    .args(["-map", "0:v:0", "-map", "1:a:0", "-shortest"]);
            }
            None => {
                invocation = invocation.args(["-c:v", "copy", "-map", "0:v:0"]);
            }
        }
        invocation.args(["-movflags", "+faststart"]).arg(output)
    }

    /// Lossless remux with the index moved to the front
    pub fn remux_faststart(&self, input: &Path, output: &Path) -> ToolInvocation {
        ToolInvocation::ffmpeg()
            .args(["-y", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "+faststart"])
            .arg(output)
    }

    /// Remux that also shifts timestamps to start at zero
    pub fn repair_container(&self, input: &Path, output: &Path) -> ToolInvocation {
        ToolInvocation::ffmpeg()
            .args(["-y", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "+faststart"])
            .args(["-avoid_negative_ts", "make_zero"])
            .arg(output)
    }

    /// Full re-encode that fixes stutter and player incompatibilities
    pub fn standardize(&self, input: &Path, output: &Path, frame_rate: FrameRate) -> ToolInvocation {
        let invocation = self
            .standard_video_args(ToolInvocation::ffmpeg().args(["-y", "-i"]).arg(input))
            .args(["-level", self.encoding.level.as_str()])
            .arg("-refs")
            .arg(self.encoding.ref_frames.to_string())
            .args(["-vsync", "cfr", "-r"])
            .arg(frame_rate.to_string());
        self.audio_args(invocation)
            .args(["-movflags", "+faststart", "-f", "mp4"])
            .arg(output)
    }

    /// Quick re-encode for files with no detected problems
    pub fn light(&self, input: &Path, output: &Path) -> ToolInvocation {
        ToolInvocation::ffmpeg()
            .args(["-y", "-i"])
            .arg(input)
            .args(["-c:v", self.encoding.video_codec.as_str()])
            .args(["-preset", self.encoding.light_preset.as_str()])
            .arg("-crf")
            .arg(self.encoding.crf.to_string())
            .args(["-pix_fmt", self.encoding.pix_fmt.as_str()])
            .args(["-c:a", "copy", "-movflags", "+faststart"])
            .arg(output)
    }
}

/// Write an ffmpeg concat demuxer list referencing `files` by absolute path
pub fn write_concat_list(list: &Path, files: &[PathBuf]) -> std::io::Result<()> {
    let mut out = std::fs::File::create(list)?;
    for file in files {
        let absolute = std::path::absolute(file)?;
        let quoted = absolute.to_string_lossy().replace('\'', r"'\''");
        writeln!(out, "file '{}'", quoted)?;
    }
    out.flush()
}
