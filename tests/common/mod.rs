/*!
 * Common test utilities for the anchorsync test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use anchorsync::subtitle_processor::SubtitleEntry;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Builds a list of entries: entry i starts at `offset_ms + i * step_ms`,
/// lasts `duration_ms`, text "Line {i}"
pub fn numbered_entries(count: usize, offset_ms: u64, step_ms: u64, duration_ms: u64) -> Vec<SubtitleEntry> {
    (0..count)
        .map(|i| {
            let start = offset_ms + i as u64 * step_ms;
            SubtitleEntry::new(i + 1, start, start + duration_ms, format!("Line {}", i))
        })
        .collect()
}

/// Renders entries to SRT text
pub fn srt_content(entries: &[SubtitleEntry]) -> String {
    let mut content = String::new();
    for entry in entries {
        content.push_str(&entry.to_string());
    }
    content
}

/// Writes a numbered-entry track to an SRT file and returns its path
pub fn write_numbered_srt(
    dir: &Path,
    filename: &str,
    count: usize,
    offset_ms: u64,
    step_ms: u64,
) -> Result<PathBuf> {
    let entries = numbered_entries(count, offset_ms, step_ms, 1500);
    create_test_file(dir, filename, &srt_content(&entries))
}
