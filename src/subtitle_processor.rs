use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SyncError;

// @module: SRT parsing, formatting and timestamp conversion

// @const: SRT time-range line regex (comma or period fractional separator)
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})")
        .unwrap()
});

// @const: Single SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})[,.](\d{3})$").unwrap()
});

// @const: Blank-line block separator
static BLOCK_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n\s*\r?\n").unwrap());

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number as found in the source file
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, newline-preserving
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm or HH:MM:SS.mmm) to milliseconds.
    ///
    /// This is the one codec operation that signals a hard error: a track
    /// whose timestamps cannot be parsed at all cannot be synchronized.
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let caps = TIMESTAMP_REGEX
            .captures(timestamp.trim())
            .ok_or_else(|| SyncError::Format(format!("Invalid SRT time format: {}", timestamp)))?;

        let hours: u64 = caps[1].parse().context("Failed to parse hours")?;
        let minutes: u64 = caps[2].parse().context("Failed to parse minutes")?;
        let seconds: u64 = caps[3].parse().context("Failed to parse seconds")?;
        let millis: u64 = caps[4].parse().context("Failed to parse milliseconds")?;

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a millisecond value to SRT format (HH:MM:SS,mmm).
    ///
    /// Negative input clamps to zero; this never produces a negative component.
    pub fn format_timestamp(ms: i64) -> String {
        let ms = ms.max(0) as u64;
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms as i64)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms as i64)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Collection of subtitle entries tied to a source file
#[derive(Debug)]
pub struct SubtitleTrack {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries, in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    /// Create a new empty subtitle track
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleTrack {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Read and parse an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        // Tolerate a UTF-8 BOM at the start of the file
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        Ok(SubtitleTrack {
            source_file: path.to_path_buf(),
            entries: Self::parse_srt_string(content),
        })
    }

    /// Parse SRT content into subtitle entries.
    ///
    /// Blocks are separated by blank lines; each block needs an integer index
    /// line, a time-range line and at least one text line. Malformed blocks
    /// are skipped individually - one bad block never aborts the whole parse.
    /// Entries keep their file order.
    pub fn parse_srt_string(content: &str) -> Vec<SubtitleEntry> {
        let mut entries = Vec::new();

        for block in BLOCK_SPLIT_REGEX.split(content.trim()) {
            let lines: Vec<&str> = block.trim().lines().collect();
            if lines.len() < 3 {
                if !block.trim().is_empty() {
                    warn!("Skipping malformed SRT block: fewer than 3 lines");
                }
                continue;
            }

            let seq_num: usize = match lines[0].trim().parse() {
                Ok(num) => num,
                Err(_) => {
                    warn!("Skipping malformed SRT block: non-integer index '{}'", lines[0].trim());
                    continue;
                }
            };

            let Some(caps) = TIMING_REGEX.captures(lines[1]) else {
                warn!("Skipping malformed SRT block {}: invalid time range '{}'", seq_num, lines[1].trim());
                continue;
            };

            let start_ms = Self::capture_to_ms(&caps, 1);
            let end_ms = Self::capture_to_ms(&caps, 5);
            let text = lines[2..].join("\n");

            entries.push(SubtitleEntry::new(seq_num, start_ms, end_ms, text));
        }

        entries
    }

    /// Serialize entries to SRT text.
    ///
    /// Entries are renumbered sequentially starting at 1 regardless of their
    /// original index. The output ends with a trailing blank line, and an
    /// inverted time range is clamped so the end never precedes the start.
    pub fn to_srt_string(entries: &[SubtitleEntry]) -> String {
        let mut output = String::new();
        for (i, entry) in entries.iter().enumerate() {
            let end_ms = entry.end_time_ms.max(entry.start_time_ms);
            output.push_str(&format!("{}\n", i + 1));
            output.push_str(&format!(
                "{} --> {}\n",
                SubtitleEntry::format_timestamp(entry.start_time_ms as i64),
                SubtitleEntry::format_timestamp(end_ms as i64)
            ));
            output.push_str(&entry.text);
            output.push_str("\n\n");
        }
        output
    }

    /// Write entries to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(entries: &[SubtitleEntry], path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
        file.write_all(Self::to_srt_string(entries).as_bytes())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }

    /// Convert matched regex captures (4 consecutive groups) to milliseconds
    fn capture_to_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
        let hours: u64 = caps.get(start_idx).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let minutes: u64 = caps.get(start_idx + 1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let seconds: u64 = caps.get(start_idx + 2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let millis: u64 = caps.get(start_idx + 3).map_or(0, |m| m.as_str().parse().unwrap_or(0));

        (hours * 3600 + minutes * 60 + seconds) * 1000 + millis
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
