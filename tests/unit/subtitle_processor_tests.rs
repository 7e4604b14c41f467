/*!
 * Tests for the SRT subtitle codec
 */

use std::fmt::Write;

use anyhow::Result;
use anchorsync::subtitle_processor::{SubtitleEntry, SubtitleTrack};

use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms as i64);
    assert_eq!(formatted, ts);
}

/// Test timestamp parsing with a period fractional separator
#[test]
fn test_timestamp_parsing_withPeriodSeparator_shouldNormalizeToComma() {
    let ms = SubtitleEntry::parse_timestamp("00:00:02.500").unwrap();
    assert_eq!(ms, 2500);
    assert_eq!(SubtitleEntry::format_timestamp(ms as i64), "00:00:02,500");
}

#[test]
fn test_timestamp_parsing_withInvalidInput_shouldFail() {
    assert!(SubtitleEntry::parse_timestamp("1:2:3,4").is_err());
    assert!(SubtitleEntry::parse_timestamp("not a timestamp").is_err());
    assert!(SubtitleEntry::parse_timestamp("00:00:02").is_err());
}

/// Negative values never leak into formatted output
#[test]
fn test_timestamp_formatting_withNegativeValue_shouldClampToZero() {
    assert_eq!(SubtitleEntry::format_timestamp(-4000), "00:00:00,000");
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatCorrectly() {
    let entry = SubtitleEntry::new(1, 5000, 10000, "Test subtitle".to_string());
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert!(output.contains("1"));
    assert!(output.contains("00:00:05,000 --> 00:00:10,000"));
    assert!(output.contains("Test subtitle"));
}

/// Test parsing of SRT content with multi-line text and CRLF endings
#[test]
fn test_parse_srt_string_withMultilineAndCrlf_shouldParseAllEntries() {
    let content = "1\r\n00:00:01,000 --> 00:00:04,000\r\nFirst line\r\nSecond line\r\n\r\n2\r\n00:00:05,000 --> 00:00:09,000\r\nAnother entry\r\n";

    let entries = SubtitleTrack::parse_srt_string(content);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].start_time_ms, 1000);
    assert_eq!(entries[0].end_time_ms, 4000);
    assert_eq!(entries[0].text, "First line\nSecond line");
    assert_eq!(entries[1].text, "Another entry");
}

/// A malformed block is skipped without aborting the rest of the parse
#[test]
fn test_parse_srt_string_withMalformedBlock_shouldSkipOnlyThatBlock() {
    let content = "1\n00:00:01,000 --> 00:00:04,000\nGood entry\n\nnot-a-number\n00:00:05,000 --> 00:00:09,000\nBad index\n\n3\nthis is not a time range\nBad timing\n\n4\n00:00:10,000 --> 00:00:14,000\nAnother good entry\n";

    let entries = SubtitleTrack::parse_srt_string(content);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Good entry");
    assert_eq!(entries[1].text, "Another good entry");
}

/// Entries keep their file order even when timestamps are out of order
#[test]
fn test_parse_srt_string_withOutOfOrderTimestamps_shouldPreserveFileOrder() {
    let content = "1\n00:01:00,000 --> 00:01:02,000\nLater\n\n2\n00:00:10,000 --> 00:00:12,000\nEarlier\n";

    let entries = SubtitleTrack::parse_srt_string(content);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Later");
    assert_eq!(entries[1].text, "Earlier");
}

/// Serialization renumbers sequentially and parse/serialize round-trips
#[test]
fn test_srt_round_trip_shouldPreserveTimingTextAndOrder() {
    let entries = vec![
        SubtitleEntry::new(7, 0, 2000, "First".to_string()),
        SubtitleEntry::new(9, 2500, 4000, "Second\nwith wrap".to_string()),
        SubtitleEntry::new(11, 5000, 6500, "Third".to_string()),
    ];

    let serialized = SubtitleTrack::to_srt_string(&entries);
    let reparsed = SubtitleTrack::parse_srt_string(&serialized);

    assert_eq!(reparsed.len(), entries.len());
    for (i, (original, round_tripped)) in entries.iter().zip(reparsed.iter()).enumerate() {
        assert_eq!(round_tripped.seq_num, i + 1, "entries are renumbered from 1");
        assert_eq!(round_tripped.start_time_ms, original.start_time_ms);
        assert_eq!(round_tripped.end_time_ms, original.end_time_ms);
        assert_eq!(round_tripped.text, original.text);
    }
}

/// An inverted time range is clamped at serialization time
#[test]
fn test_to_srt_string_withInvertedRange_shouldClampEndToStart() {
    let entries = vec![SubtitleEntry::new(1, 5000, 3000, "Inverted".to_string())];
    let serialized = SubtitleTrack::to_srt_string(&entries);
    assert!(serialized.contains("00:00:05,000 --> 00:00:05,000"));
}

/// Test loading a file with a UTF-8 BOM
#[test]
fn test_from_file_withBom_shouldParseNormally() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "\u{feff}1\n00:00:01,000 --> 00:00:04,000\nBOM entry\n";
    let path = common::create_test_file(temp_dir.path(), "bom.srt", content)?;

    let track = SubtitleTrack::from_file(&path)?;
    assert_eq!(track.entries.len(), 1);
    assert_eq!(track.entries[0].text, "BOM entry");
    Ok(())
}

/// Test writing to a file and reading it back
#[test]
fn test_write_to_srt_shouldRoundTripThroughDisk() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let entries = common::numbered_entries(5, 1000, 3000, 2000);

    let path = temp_dir.path().join("nested").join("out.srt");
    SubtitleTrack::write_to_srt(&entries, &path)?;
    assert!(path.exists(), "parent directories are created on demand");

    let track = SubtitleTrack::from_file(&path)?;
    assert_eq!(track.entries.len(), 5);
    assert_eq!(track.entries[2].start_time_ms, 7000);
    assert_eq!(track.entries[2].text, "Line 2");
    Ok(())
}
