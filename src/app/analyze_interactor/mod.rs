// Analyze interactor - Orchestrates the detection passes and strategy decision

use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::adapters::toml_config::DetectionConfig;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::FfmpegCommands;
use crate::error::VidfixResult;
use crate::ports::*;
use crate::utils::time::{format_clock, format_span};

/// Freezes listed individually before the summary line
const FREEZES_SHOWN: usize = 3;

/// Interactor for the analysis use case.
///
/// Every detection pass degrades to "no issue" on failure, so analysis
/// always produces a report.
pub struct AnalyzeInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    commands: FfmpegCommands,
    detection: DetectionConfig,
}

impl AnalyzeInteractor {
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

    /// Run all detection passes and choose a strategy
    pub async fn analyze(&self, input: &Path) -> AnalysisReport {
        println!("\n{}", "=".repeat(60));
        println!("Analysis");
        println!("{}", "=".repeat(60));
        info!("Analyzing {}", input.display());

        let media = self.media_info(input).await;

        let mut issues = IssueSet {
            freezes: self.detect_freezes(input).await,
            ..Default::default()
        };

        println!("Checking container...");
        issues.moov_late = self.check_layout(input).await;
        issues.timestamp_bad = self.scan_timestamps(input).await;

        println!("Checking compatibility...");
        issues.need_reencode = self.check_compatibility(&media);

        let strategy = StrategySelector::select(issues.flags());
        println!("\nDeciding...");
        println!("  Strategy: {}", strategy);
        info!(?strategy, flags = ?issues.flags(), "Strategy selected");

        AnalysisReport {
            media,
            issues,
            strategy,
        }
    }

    async fn media_info(&self, input: &Path) -> MediaInfo {
        println!("Reading media info...");
        match self.probe_port.probe_media(input).await {
            Ok(media) => {
                println!("  Size: {:.2} MB", media.size_mb());
                println!("  Video duration: {}", format_span(media.duration));
                match &media.audio_codec {
                    Some(codec) => {
                        println!("  Audio duration: {}", format_span(media.audio_duration));
                        println!("  Audio codec: {}", codec);
                    }
                    None => println!("  Warning: no audio stream detected"),
                }
                println!("  Video codec: {} ({})", media.codec, media.profile);
                println!("  Pixel format: {}", media.pix_fmt);
                media
            }
            Err(e) => {
                println!("  Warning: probing failed: {}", e);
                warn!("Falling back to assumed media info: {}", e);
                MediaInfo::assumed()
            }
        }
    }

    /// Freeze intervals at least `freeze_min_keep_secs` long
    pub async fn detect_freezes(&self, input: &Path) -> Vec<FreezeInterval> {
        println!("Detecting static sections...");

        let invocation = self.commands.detect_freezes(input);
        let output = match self
            .execute_port
            .capture(&invocation, Some(self.detection.freeze_timeout()))
            .await
        {
            Ok(output) => output,
            Err(e) => {
                println!("  Warning: detection failed: {}", e);
                warn!("Freeze detection failed: {}", e);
                return Vec::new();
            }
        };

        let freezes = FreezeLogParser::parse(&output.stderr, self.detection.freeze_min_keep_secs);
        if freezes.is_empty() {
            println!("  No static sections");
            return freezes;
        }

        println!("  Found {} static sections", freezes.len());
        for (i, freeze) in freezes.iter().take(FREEZES_SHOWN).enumerate() {
            println!(
                "    Section {}: {}-{} ({:.1}s)",
                i + 1,
                format_clock(freeze.start),
                format_clock(freeze.end),
                freeze.duration()
            );
        }
        if freezes.len() > FREEZES_SHOWN {
            println!("    ... {} in total", freezes.len());
        }
        freezes
    }

    /// Whether the index atom is missing from the header or follows the payload
    pub async fn check_layout(&self, input: &Path) -> bool {
        match self.read_header(input).await {
            Ok(header) => {
                let layout = AtomLayout::scan(&header);
                debug!(?layout, "Header atoms");
                if layout.is_moov_late() {
                    println!("  moov atom misplaced (hurts streaming playback)");
                    true
                } else {
                    println!("  moov atom position OK");
                    false
                }
            }
            Err(e) => {
                warn!("Could not read header of {}: {}", input.display(), e);
                false
            }
        }
    }

    async fn read_header(&self, input: &Path) -> VidfixResult<Vec<u8>> {
        let file = tokio::fs::File::open(input).await?;
        let mut header = Vec::with_capacity(self.detection.header_scan_bytes);
        file.take(self.detection.header_scan_bytes as u64)
            .read_to_end(&mut header)
            .await?;
        Ok(header)
    }

    /// Whether a decode pass reports timing errors
    pub async fn scan_timestamps(&self, input: &Path) -> bool {
        let invocation = self.commands.scan_errors(input);
        match self
            .execute_port
            .capture(&invocation, Some(self.detection.error_scan_timeout()))
            .await
        {
            Ok(output) if TimestampRules::has_anomalies(&output.stderr) => {
                println!("  Timestamp anomalies");
                true
            }
            Ok(_) => {
                println!("  Timestamps OK");
                false
            }
            Err(e) => {
                warn!("Timestamp scan failed: {}", e);
                false
            }
        }
    }

    fn check_compatibility(&self, media: &MediaInfo) -> bool {
        let issues = CompatibilityRules::check(media);
        for issue in &issues {
            match issue {
                CompatibilityIssue::PixelFormat(fmt) => {
                    println!("  Non-standard pixel format: {}", fmt)
                }
                CompatibilityIssue::Profile(profile) => {
                    println!("  Profile may be incompatible: {}", profile)
                }
            }
        }
        !issues.is_empty()
    }
}
