// Repair interactor - Executes the selected repair strategy

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::toml_config::DetectionConfig;
use crate::domain::model::*;
use crate::domain::rules::SegmentCalculator;
use crate::engine::{write_concat_list, FfmpegCommands, ScratchWorkspace};
use crate::error::{VidfixError, VidfixResult};
use crate::ports::*;
use crate::utils::time::{format_clock, format_span};

/// Video and audio durations closer than this count as matching
const DURATION_MATCH_SECS: f64 = 1.0;

/// Interactor for the repair use case
pub struct RepairInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    commands: FfmpegCommands,
    detection: DetectionConfig,
}

/// Locations a repair run reads from and writes to
pub struct RepairRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub workspace: &'a ScratchWorkspace,
}

impl RepairInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        commands: FfmpegCommands,
        detection: DetectionConfig,
    ) -> Self {
        Self {
            probe_port,
            execute_port,
            commands,
            detection,
        }
    }

    /// Dispatch on the strategy chosen by analysis
    pub async fn execute(
        &self,
        report: &AnalysisReport,
        request: &RepairRequest<'_>,
    ) -> VidfixResult<()> {
        println!("\n{}", "=".repeat(60));
        println!("Repairing");
        println!("{}", "=".repeat(60));
        info!(strategy = %report.strategy, output = %request.output.display(), "Repair started");

        match report.strategy {
            RepairStrategy::FullFix => self.full_fix(report, request).await,
            RepairStrategy::RemoveFreeze => self.remove_freeze(report, request).await,
            RepairStrategy::FixCompatibility => self.fix_compatibility(report, request).await,
            RepairStrategy::Light => self.light(request).await,
        }
    }

    /// Run one ffmpeg stage; it succeeded when `target` exists afterwards
    async fn run_stage(
        &self,
        stage: &str,
        invocation: &ToolInvocation,
        target: &Path,
    ) -> VidfixResult<()> {
        // a leftover file would mask a failed run
        if target.exists() {
            tokio::fs::remove_file(target).await?;
        }

        let outcome = self.execute_port.run(invocation).await?;
        if !outcome.success {
            warn!("Stage '{}' exited with {:?}", stage, outcome.exit_code);
        }

        if target.exists() {
            Ok(())
        } else {
            Err(VidfixError::StageOutputMissing {
                stage: stage.to_string(),
                path: target.to_path_buf(),
            })
        }
    }

    fn segments(&self, media: &MediaInfo, issues: &IssueSet) -> Vec<Segment> {
        let segments = SegmentCalculator::valid_segments(
            media.duration,
            &issues.freezes,
            self.detection.segment_tolerance_secs,
        );

        println!("\n  Valid segments ({}):", segments.len());
        for (i, segment) in segments.iter().enumerate() {
            println!(
                "    Segment {}: {}-{} (duration {:.1}s)",
                i + 1,
                format_clock(segment.start),
                format_clock(segment.end),
                segment.duration()
            );
        }
        let total: f64 = segments.iter().map(Segment::duration).sum();
        println!("    Total: {}", format_span(total));

        segments
    }

    async fn full_fix(&self, report: &AnalysisReport, request: &RepairRequest<'_>) -> VidfixResult<()> {
        println!("\nFull repair...");
        let media = &report.media;

        let segments = self.segments(media, &report.issues);
        if segments.is_empty() {
            println!("  No valid segments");
            return Err(VidfixError::NoValidSegments);
        }

        if SegmentCalculator::spans_whole(
            &segments,
            media.duration,
            self.detection.segment_tolerance_secs,
        ) {
            println!("  Single segment covers the whole file, re-encoding...");
            let invocation =
                self.commands
                    .standardize(request.input, request.output, media.frame_rate);
            return self.run_stage("standardize", &invocation, request.output).await;
        }

        let audio = self.extract_audio(media, request).await?;
        let merged = self.encode_and_merge(&segments, request).await?;

        let video_duration = self.probe_port.probe_duration(&merged).await.ok();
        let audio_duration = audio.as_ref().and_then(|(_, duration)| *duration);
        self.print_summary(report, video_duration, audio_duration);

        println!("\n  Step 4/4: mux video and audio");
        let invocation = self.commands.mux(
            &merged,
            audio.as_ref().map(|(path, _)| path.as_path()),
            request.output,
        );
        self.run_stage("mux", &invocation, request.output).await?;

        println!("\n  Full repair succeeded");
        Ok(())
    }

    /// Full audio track and its probed duration; `None` for silent media
    async fn extract_audio(
        &self,
        media: &MediaInfo,
        request: &RepairRequest<'_>,
    ) -> VidfixResult<Option<(PathBuf, Option<f64>)>> {
        println!("\n  Step 1/4: extract full audio");
        if !media.has_audio() {
            println!("     No audio stream, output will be video only");
            return Ok(None);
        }
        println!("     Expected audio duration: {}", format_span(media.audio_duration));

        let audio = request.workspace.file("audio.aac");
        let invocation = self.commands.extract_audio(request.input, &audio);
        if let Err(e) = self.run_stage("audio extraction", &invocation, &audio).await {
            println!("     Audio extraction failed");
            return Err(e);
        }

        let duration = match self.probe_port.probe_duration(&audio).await {
            Ok(duration) => {
                println!("     Audio extracted: {}", format_span(duration));
                Some(duration)
            }
            Err(e) => {
                warn!("Could not probe extracted audio: {}", e);
                println!("     Audio extracted (duration unknown)");
                None
            }
        };
        Ok(Some((audio, duration)))
    }

    /// Re-encode every segment and stream-copy them into one video-only file
    async fn encode_and_merge(
        &self,
        segments: &[Segment],
        request: &RepairRequest<'_>,
    ) -> VidfixResult<PathBuf> {
        println!("\n  Step 2/4: process video segments ({})", segments.len());

        let mut encoded = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let index = i + 1;
            println!(
                "\n     Segment {}/{}: {}-{} ({:.1}s)",
                index,
                segments.len(),
                format_clock(segment.start),
                format_clock(segment.end),
                segment.duration()
            );

            let file = request.workspace.file(&format!("s{}.mp4", index));
            let invocation = self.commands.encode_segment(request.input, segment, &file);
            match self.run_stage("segment encode", &invocation, &file).await {
                Ok(()) => {
                    println!("     Segment {} done", index);
                    encoded.push(file);
                }
                Err(VidfixError::StageOutputMissing { .. }) => {
                    println!("     Segment {} failed", index);
                }
                Err(e) => return Err(e),
            }
        }

        if encoded.is_empty() {
            println!("\n     No segment was extracted");
            return Err(VidfixError::NoSegmentsExtracted);
        }

        println!("\n  Step 3/4: merge video segments");
        println!("     Merging {} segments...", encoded.len());
        let list = request.workspace.file("concat.txt");
        write_concat_list(&list, &encoded)?;

        let merged = request.workspace.file("video_merged.mp4");
        let invocation = self.commands.concat_copy(&list, &merged);
        if let Err(e) = self.run_stage("video merge", &invocation, &merged).await {
            println!("     Video merge failed");
            return Err(e);
        }
        println!("     Video merged");
        Ok(merged)
    }

    fn print_summary(
        &self,
        report: &AnalysisReport,
        video_duration: Option<f64>,
        audio_duration: Option<f64>,
    ) {
        let original = report.media.duration;
        let removed = SegmentCalculator::frozen_coverage(&report.issues.freezes);

        if let Some(video) = video_duration {
            println!("     Processed video: {}", format_span(video));
        }
        if let Some(audio) = audio_duration {
            println!("     Full audio:      {}", format_span(audio));
        }

        println!("\n  Summary:");
        println!("     Original:      {}", format_span(original));
        println!("     Removed:       {}", format_span(removed));
        println!("     Kept video:    {}", format_span(original - removed));

        match (video_duration, audio_duration) {
            (Some(video), Some(audio)) => {
                println!("     Final output:  {}", format_span(video.min(audio)));
                let diff = video - audio;
                if diff.abs() < DURATION_MATCH_SECS {
                    println!("\n     Video and audio lengths match");
                } else if diff > 0.0 {
                    println!("\n     Video is {:.1}s longer than audio, the tail will be silent", diff);
                } else {
                    println!("\n     Audio is {:.1}s longer than video, it will be cut", -diff);
                }
            }
            (Some(video), None) => println!("     Final output:  {}", format_span(video)),
            _ => {}
        }
    }

    async fn remove_freeze(
        &self,
        report: &AnalysisReport,
        request: &RepairRequest<'_>,
    ) -> VidfixResult<()> {
        println!("\nRemoving static sections...");
        let media = &report.media;

        let segments = self.segments(media, &report.issues);
        if segments.is_empty() {
            return Err(VidfixError::NoValidSegments);
        }

        if SegmentCalculator::spans_whole(
            &segments,
            media.duration,
            self.detection.segment_tolerance_secs,
        ) {
            let invocation = self.commands.remux_faststart(request.input, request.output);
            return self.run_stage("remux", &invocation, request.output).await;
        }

        let mut extracted = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let file = request.workspace.file(&format!("s{}.mp4", i + 1));
            let invocation =
                self.commands
                    .copy_segment(request.input, segment, media.has_audio(), &file);
            match self.run_stage("segment copy", &invocation, &file).await {
                Ok(()) => extracted.push(file),
                Err(VidfixError::StageOutputMissing { .. }) => {
                    println!("     Segment {} failed", i + 1)
                }
                Err(e) => return Err(e),
            }
        }

        if extracted.is_empty() {
            return Err(VidfixError::NoSegmentsExtracted);
        }

        let list = request.workspace.file("list.txt");
        write_concat_list(&list, &extracted)?;
        let invocation = self.commands.concat_reencode_audio(&list, request.output);
        self.run_stage("concat", &invocation, request.output).await
    }

    async fn fix_compatibility(
        &self,
        report: &AnalysisReport,
        request: &RepairRequest<'_>,
    ) -> VidfixResult<()> {
        println!("\nFixing compatibility...");

        let mut current = request.input.to_path_buf();
        if report.issues.has_container_issue() {
            println!("  1. Repairing container...");
            let step1 = request.workspace.file("step1.mp4");
            let invocation = self.commands.repair_container(request.input, &step1);
            match self.run_stage("container repair", &invocation, &step1).await {
                Ok(()) => current = step1,
                Err(VidfixError::StageOutputMissing { .. }) => {
                    warn!("Container repair produced nothing, continuing from the input")
                }
                Err(e) => return Err(e),
            }
        }

        println!("  2. Standardizing encoding...");
        let invocation =
            self.commands
                .standardize(&current, request.output, report.media.frame_rate);
        self.run_stage("standardize", &invocation, request.output).await
    }

    async fn light(&self, request: &RepairRequest<'_>) -> VidfixResult<()> {
        println!("\nLight optimization...");
        let invocation = self.commands.light(request.input, request.output);
        self.run_stage("light", &invocation, request.output).await
    }
}
