//! Progress extraction from ffmpeg's diagnostic stream
//!
//! ffmpeg rewrites its status line with carriage returns, so a line ends at
//! either `\r` or `\n`.

use std::sync::OnceLock;

use regex::Regex;

/// Splits a byte stream into lines terminated by `\r` or `\n`
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\r' || byte == b'\n' {
                if !self.pending.is_empty() {
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                }
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Flush an unterminated trailing line
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

fn time_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"time=(\d+:\d+:\d+)").ok())
        .as_ref()
}

/// Extract the `HH:MM:SS` part of the first well-formed `time=` token
pub fn progress_time(line: &str) -> Option<&str> {
    time_pattern()?
        .captures(line)?
        .get(1)
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splitter_handles_carriage_returns() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"Input #0, mov\nframe=  10 time=00:00:01.00\rframe=  20 time=00:00:02.");
        assert_eq!(
            lines,
            vec!["Input #0, mov".to_string(), "frame=  10 time=00:00:01.00".to_string()]
        );

        let lines = splitter.push(b"00 bitrate=N/A\r\n");
        assert_eq!(lines, vec!["frame=  20 time=00:00:02.00 bitrate=N/A".to_string()]);
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_splitter_flushes_tail() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push(b"no newline").is_empty());
        assert_eq!(splitter.finish().as_deref(), Some("no newline"));
    }

    #[test]
    fn test_progress_time_extraction() {
        assert_eq!(
            progress_time("frame= 300 fps=60 q=28.0 size=1024kB time=00:01:05.23 bitrate=128k"),
            Some("00:01:05")
        );
        assert_eq!(progress_time("size=N/A time=1:02:03"), Some("1:02:03"));
        assert_eq!(progress_time("size=N/A time=N/A bitrate=N/A"), None);
        assert_eq!(progress_time("time=00:12"), None);
        assert_eq!(progress_time("Stream mapping:"), None);
    }

    #[test]
    fn test_progress_time_skips_unavailable_tokens() {
        assert_eq!(
            progress_time("out_time=N/A frame=12 time=00:00:05.00 bitrate=N/A"),
            Some("00:00:05")
        );
        assert_eq!(progress_time("time=N/A speed=1x time=00:10:00"), Some("00:10:00"));
    }
}
