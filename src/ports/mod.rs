// Ports - Interface definitions (contracts)

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::model::MediaInfo;
use crate::error::{VidfixError, VidfixResult};

/// External binaries the tool drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Ffmpeg => f.write_str("ffmpeg"),
            Tool::Ffprobe => f.write_str("ffprobe"),
        }
    }
}

/// One command line for an external tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool: Tool,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(tool: Tool) -> Self {
        Self { tool, args: Vec::new() }
    }

    pub fn ffmpeg() -> Self {
        Self::new(Tool::Ffmpeg)
    }

    pub fn ffprobe() -> Self {
        Self::new(Tool::Ffprobe)
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Arguments as UTF-8 strings, for logging and assertions
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Value following the first occurrence of `flag`
    pub fn value_of(&self, flag: &str) -> Option<String> {
        let args = self.args_lossy();
        let pos = args.iter().position(|a| a == flag)?;
        args.get(pos + 1).cloned()
    }

    /// The last argument, which is the output target for ffmpeg
    pub fn target(&self) -> Option<&OsStr> {
        self.args.last().map(OsString::as_os_str)
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tool, self.args_lossy().join(" "))
    }
}

/// Exit status of a progress-streamed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
}

/// Everything a captured run wrote
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Port for running the external media toolchain
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run to completion, echoing progress to the console
    async fn run(&self, invocation: &ToolInvocation) -> VidfixResult<RunOutcome>;

    /// Run and capture stdout/stderr. When `timeout` elapses the child is
    /// killed and `VidfixError::ToolTimeout` is returned.
    async fn capture(
        &self,
        invocation: &ToolInvocation,
        timeout: Option<Duration>,
    ) -> VidfixResult<CapturedOutput>;
}

/// Per-stream facts used by output verification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSummary {
    pub codec_type: String,
    pub codec_name: Option<String>,
    pub profile: Option<String>,
    pub pix_fmt: Option<String>,
    pub duration: Option<f64>,
}

/// Format-level duration plus stream summaries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub format_duration: Option<f64>,
    pub streams: Vec<StreamSummary>,
}

impl ProbeReport {
    /// First stream of the given type (`video`, `audio`, ...)
    pub fn first_of(&self, codec_type: &str) -> Option<&StreamSummary> {
        self.streams.iter().find(|s| s.codec_type == codec_type)
    }

    /// Stream duration, falling back to the container duration
    pub fn duration_of(&self, codec_type: &str) -> Option<f64> {
        self.first_of(codec_type)
            .and_then(|s| s.duration.or(self.format_duration))
    }
}

/// Port for media file probing and analysis
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe format and streams into the analysis model
    async fn probe_media(&self, path: &Path) -> VidfixResult<MediaInfo>;

    /// Probe durations and video parameters of a produced file
    async fn probe_report(&self, path: &Path) -> VidfixResult<ProbeReport>;

    /// Container duration in seconds
    async fn probe_duration(&self, path: &Path) -> VidfixResult<f64> {
        self.probe_report(path)
            .await?
            .format_duration
            .ok_or_else(|| VidfixError::ProbeError {
                message: format!("no duration reported for {}", path.display()),
            })
    }
}
