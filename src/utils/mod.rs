//! Common utilities and helpers

pub mod logging;
pub mod time;

use std::path::{Path, PathBuf};

/// Default output path: `<stem>_fixed<.ext>` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}_fixed.{}", stem, ext.to_string_lossy()),
        None => format!("{}_fixed", stem),
    };
    input.with_file_name(name)
}

/// Format a byte count in megabytes
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1_048_576.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/videos/lecture.mp4")),
            PathBuf::from("/videos/lecture_fixed.mp4")
        );
        assert_eq!(
            default_output_path(Path::new("clip.final.MP4")),
            PathBuf::from("clip.final_fixed.MP4")
        );
        assert_eq!(
            default_output_path(Path::new("raw")),
            PathBuf::from("raw_fixed")
        );
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.00 MB");
        assert_eq!(format_megabytes(3 * 1_048_576 / 2), "1.50 MB");
    }
}
