// Domain rules - Business logic and policies

use std::cmp::Ordering;

use crate::domain::model::*;

/// Gaps shorter than this are not worth keeping as a segment
pub const SEGMENT_TOLERANCE_SECS: f64 = 0.5;

/// Profiles every mainstream H.264 decoder handles
pub const COMPATIBLE_PROFILES: [&str; 3] = ["High", "Main", "Baseline"];

/// Pixel format with standard 4:2:0 chroma subsampling
pub const STANDARD_PIX_FMT: &str = "yuv420p";

/// Substrings of decoder error output that indicate broken timing
const TIMESTAMP_MARKERS: [&str; 4] = ["timestamp", "dts", "pts", "non-monotonic"];

fn by_start(a: &FreezeInterval, b: &FreezeInterval) -> Ordering {
    a.start
        .total_cmp(&b.start)
        .then_with(|| a.end.total_cmp(&b.end))
}

/// Reconciles detected freezes against the total duration
pub struct SegmentCalculator;

impl SegmentCalculator {
    /// Compute the ordered, non-overlapping ranges to keep.
    ///
    /// Intervals may be unsorted or overlapping. A gap is emitted only when
    /// it is longer than `tolerance`; the cursor never moves backwards, so
    /// overlapping freezes collapse into their union.
    pub fn valid_segments(
        duration: f64,
        freezes: &[FreezeInterval],
        tolerance: f64,
    ) -> Vec<Segment> {
        if freezes.is_empty() {
            return vec![Segment::new(0.0, duration)];
        }

        let mut sorted = freezes.to_vec();
        sorted.sort_by(by_start);

        let mut segments = Vec::new();
        let mut cursor = 0.0_f64;

        for freeze in &sorted {
            if freeze.start > cursor + tolerance {
                segments.push(Segment::new(cursor, freeze.start));
            }
            cursor = cursor.max(freeze.end);
        }

        if cursor < duration - tolerance {
            segments.push(Segment::new(cursor, duration));
        }

        segments
    }

    /// Total time covered by the union of the intervals
    pub fn frozen_coverage(freezes: &[FreezeInterval]) -> f64 {
        let mut sorted = freezes.to_vec();
        sorted.sort_by(by_start);

        let mut total = 0.0;
        let mut current: Option<(f64, f64)> = None;

        for freeze in sorted {
            current = match current {
                Some((start, end)) if freeze.start <= end => Some((start, end.max(freeze.end))),
                Some((start, end)) => {
                    total += end - start;
                    Some((freeze.start, freeze.end))
                }
                None => Some((freeze.start, freeze.end)),
            };
        }

        if let Some((start, end)) = current {
            total += end - start;
        }
        total
    }

    /// Whether a single segment is effectively the whole input
    pub fn spans_whole(segments: &[Segment], duration: f64, tolerance: f64) -> bool {
        match segments {
            [only] => only.start <= tolerance && only.end >= duration - tolerance,
            _ => false,
        }
    }
}

/// Decision table mapping issue flags to a repair strategy
pub struct StrategySelector;

impl StrategySelector {
    pub fn select(flags: IssueFlags) -> RepairStrategy {
        let structural = flags.has_container_issue || flags.needs_reencode;
        match (flags.has_freezes, structural) {
            (true, true) => RepairStrategy::FullFix,
            (true, false) => RepairStrategy::RemoveFreeze,
            (false, true) => RepairStrategy::FixCompatibility,
            (false, false) => RepairStrategy::Light,
        }
    }
}

/// Reason a stream has to be re-encoded for broad playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompatibilityIssue {
    PixelFormat(String),
    Profile(String),
}

/// Player compatibility policy
pub struct CompatibilityRules;

impl CompatibilityRules {
    /// List everything about the video stream that forces a re-encode.
    ///
    /// Assumed media yields nothing: there is no evidence of a problem.
    pub fn check(media: &MediaInfo) -> Vec<CompatibilityIssue> {
        if media.assumed {
            return Vec::new();
        }

        let mut issues = Vec::new();
        if media.pix_fmt != STANDARD_PIX_FMT {
            issues.push(CompatibilityIssue::PixelFormat(media.pix_fmt.clone()));
        }
        if !COMPATIBLE_PROFILES.contains(&media.profile.as_str()) {
            issues.push(CompatibilityIssue::Profile(media.profile.clone()));
        }
        issues
    }
}

/// Parser for the freeze detection filter's log lines
pub struct FreezeLogParser;

impl FreezeLogParser {
    const START_MARKER: &'static str = "freeze_start:";
    const END_MARKER: &'static str = "freeze_end:";

    /// Pair up start/end markers, dropping freezes shorter than `min_duration`.
    ///
    /// An end marker without a preceding start is ignored, and a start with
    /// no end (freeze running to the end of file) is never reported.
    pub fn parse(log: &str, min_duration: f64) -> Vec<FreezeInterval> {
        let mut freezes = Vec::new();
        let mut open: Option<f64> = None;

        for line in log.lines() {
            if let Some((_, rest)) = line.split_once(Self::START_MARKER) {
                if let Ok(start) = rest.trim().parse::<f64>() {
                    open = Some(start);
                }
            } else if let Some((_, rest)) = line.split_once(Self::END_MARKER) {
                let Some(start) = open else { continue };
                let Some(end) = rest.split_whitespace().next().and_then(|t| t.parse::<f64>().ok())
                else {
                    continue;
                };
                if end - start >= min_duration {
                    freezes.push(FreezeInterval::new(start, end));
                }
                open = None;
            }
        }

        freezes
    }
}

/// Heuristic over decoder error output
pub struct TimestampRules;

impl TimestampRules {
    pub fn has_anomalies(error_log: &str) -> bool {
        let lowered = error_log.to_lowercase();
        TIMESTAMP_MARKERS.iter().any(|marker| lowered.contains(marker))
    }
}

/// Positions of the top-level atoms found in the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomLayout {
    pub moov: Option<usize>,
    pub mdat: Option<usize>,
}

impl AtomLayout {
    /// Locate `moov` and `mdat` tags in the leading bytes of a file
    pub fn scan(header: &[u8]) -> Self {
        Self {
            moov: find_tag(header, b"moov"),
            mdat: find_tag(header, b"mdat"),
        }
    }

    /// The index is missing from the header or follows the payload
    pub fn is_moov_late(&self) -> bool {
        match (self.moov, self.mdat) {
            (None, _) => true,
            (Some(moov), Some(mdat)) => moov > mdat,
            (Some(_), None) => false,
        }
    }
}

fn find_tag(haystack: &[u8], tag: &[u8; 4]) -> Option<usize> {
    haystack.windows(tag.len()).position(|window| window == tag)
}

#[cfg(test)]
mod tests;
