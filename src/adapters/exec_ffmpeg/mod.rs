//! FFmpeg execution adapter
//!
//! Spawns the configured ffmpeg/ffprobe binaries through `tokio::process`.
//! Children are created with `kill_on_drop`, so dropping a timed-out or
//! cancelled future terminates the process.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::adapters::toml_config::ToolsConfig;
use crate::engine::progress::{progress_time, LineSplitter};
use crate::error::{VidfixError, VidfixResult};
use crate::ports::*;

/// Subprocess-backed execution adapter
pub struct FFmpegAdapter {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FFmpegAdapter {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            ffprobe: tools.ffprobe.clone(),
        }
    }

    fn command(&self, invocation: &ToolInvocation) -> Command {
        let program = match invocation.tool {
            Tool::Ffmpeg => &self.ffmpeg,
            Tool::Ffprobe => &self.ffprobe,
        };
        let mut cmd = Command::new(program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn launch_error(invocation: &ToolInvocation, err: std::io::Error) -> VidfixError {
        VidfixError::ToolLaunch {
            tool: invocation.tool.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ExecutePort for FFmpegAdapter {
    async fn run(&self, invocation: &ToolInvocation) -> VidfixResult<RunOutcome> {
        debug!("Running: {}", invocation);

        let mut child = self
            .command(invocation)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::launch_error(invocation, e))?;

        let mut splitter = LineSplitter::new();
        let mut shown_progress = false;

        if let Some(mut stderr) = child.stderr.take() {
            let mut buf = [0u8; 4096];
            loop {
                let read = stderr.read(&mut buf).await?;
                if read == 0 {
                    break;
                }
                for line in splitter.push(&buf[..read]) {
                    shown_progress |= report_line(&line);
                }
            }
            if let Some(line) = splitter.finish() {
                shown_progress |= report_line(&line);
            }
        }

        let status = child.wait().await?;
        if shown_progress {
            println!();
        }
        if !status.success() {
            warn!("{} exited with {:?}", invocation.tool, status.code());
        }

        Ok(RunOutcome {
            success: status.success(),
            exit_code: status.code(),
        })
    }

    async fn capture(
        &self,
        invocation: &ToolInvocation,
        timeout: Option<Duration>,
    ) -> VidfixResult<CapturedOutput> {
        debug!("Capturing: {}", invocation);

        let child = self
            .command(invocation)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::launch_error(invocation, e))?;

        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| VidfixError::ToolTimeout {
                    tool: invocation.tool.to_string(),
                    timeout: limit,
                })??,
            None => child.wait_with_output().await?,
        };

        Ok(CapturedOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Echo a progress line in place; everything else goes to the debug log.
/// Returns whether anything was written to the console.
fn report_line(line: &str) -> bool {
    match progress_time(line) {
        Some(time) => {
            print!("\r    {}", time);
            let _ = std::io::stdout().flush();
            true
        }
        None => {
            debug!("ffmpeg: {}", line);
            false
        }
    }
}
