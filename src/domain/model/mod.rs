// Domain models - Core types and data structures

use std::fmt;

/// Duration assumed when the input could not be probed
pub const FALLBACK_DURATION_SECS: f64 = 900.0;

/// Rational frame rate as reported by the prober (`r_frame_rate`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// Create a frame rate, rejecting zero components
    pub fn new(num: u32, den: u32) -> Option<Self> {
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    /// Parse `num/den` or a plain integer rate
    pub fn parse(rate: &str) -> Option<Self> {
        let rate = rate.trim();
        match rate.split_once('/') {
            Some((num, den)) => Self::new(num.trim().parse().ok()?, den.trim().parse().ok()?),
            None => Self::new(rate.parse().ok()?, 1),
        }
    }

    /// Parse, falling back to 30 fps for anything unusable
    pub fn parse_or_default(rate: &str) -> Self {
        Self::parse(rate).unwrap_or_default()
    }

    /// Frames per second as a float
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Media information captured once from the prober
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Container duration in seconds
    pub duration: f64,
    /// Audio stream duration, container duration when the stream has none
    pub audio_duration: f64,
    /// File size in bytes
    pub size_bytes: u64,
    pub frame_rate: FrameRate,
    pub codec: String,
    pub profile: String,
    pub pix_fmt: String,
    /// `None` when the prober found no audio stream
    pub audio_codec: Option<String>,
    /// Values are defaults because probing failed
    pub assumed: bool,
}

impl MediaInfo {
    /// Defaults used when the prober is unavailable or its output unusable
    pub fn assumed() -> Self {
        Self {
            duration: FALLBACK_DURATION_SECS,
            audio_duration: FALLBACK_DURATION_SECS,
            size_bytes: 0,
            frame_rate: FrameRate::default(),
            codec: "unknown".to_string(),
            profile: "unknown".to_string(),
            pix_fmt: "unknown".to_string(),
            audio_codec: None,
            assumed: true,
        }
    }

    /// Whether an audio track should be carried through the repair.
    ///
    /// Assumed media keeps the audio path enabled since nothing is known.
    pub fn has_audio(&self) -> bool {
        self.assumed || self.audio_codec.is_some()
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// A detected static section of the video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreezeInterval {
    pub start: f64,
    pub end: f64,
}

impl FreezeInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A `[start, end)` range of the input that is kept
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// The three inputs of the strategy decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueFlags {
    pub has_freezes: bool,
    pub has_container_issue: bool,
    pub needs_reencode: bool,
}

/// Everything the analysis pass found wrong with the input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueSet {
    pub freezes: Vec<FreezeInterval>,
    /// `moov` missing from the header or placed after `mdat`
    pub moov_late: bool,
    /// Decoder reported timestamp anomalies
    pub timestamp_bad: bool,
    /// Pixel format or profile is not broadly playable
    pub need_reencode: bool,
}

impl IssueSet {
    pub fn has_freezes(&self) -> bool {
        !self.freezes.is_empty()
    }

    pub fn has_container_issue(&self) -> bool {
        self.moov_late || self.timestamp_bad
    }

    pub fn flags(&self) -> IssueFlags {
        IssueFlags {
            has_freezes: self.has_freezes(),
            has_container_issue: self.has_container_issue(),
            needs_reencode: self.need_reencode,
        }
    }
}

/// Mutually exclusive repair strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepairStrategy {
    /// Remove frozen sections and standardize the encoding
    FullFix,
    /// Remove frozen sections only
    RemoveFreeze,
    /// Repair the container and standardize the encoding
    FixCompatibility,
    /// Light re-encode with fast-start layout
    Light,
}

impl RepairStrategy {
    pub const ALL: [RepairStrategy; 4] = [
        RepairStrategy::FullFix,
        RepairStrategy::RemoveFreeze,
        RepairStrategy::FixCompatibility,
        RepairStrategy::Light,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepairStrategy::FullFix => "full_fix",
            RepairStrategy::RemoveFreeze => "remove_freeze",
            RepairStrategy::FixCompatibility => "fix_compatibility",
            RepairStrategy::Light => "light",
        }
    }

    /// Ordered plan steps shown before confirmation
    pub fn steps(&self) -> &'static [&'static str] {
        match self {
            RepairStrategy::FullFix => &[
                "1. Remove static segments",
                "2. Repair container structure",
                "3. Standardize encoding (fix stutter)",
            ],
            RepairStrategy::RemoveFreeze => &[
                "1. Remove static segments",
                "2. Optimize container",
            ],
            RepairStrategy::FixCompatibility => &[
                "1. Repair container structure",
                "2. Standardize encoding (fix stutter)",
            ],
            RepairStrategy::Light => &["1. Light optimization"],
        }
    }
}

impl fmt::Display for RepairStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the analysis pass
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub media: MediaInfo,
    pub issues: IssueSet,
    pub strategy: RepairStrategy,
}

#[cfg(test)]
mod tests;
