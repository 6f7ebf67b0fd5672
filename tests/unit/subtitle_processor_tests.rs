/*!
 * Tests for SRT parsing
 */

use std::fmt::Write;
use anyhow::Result;
use lyricsync::errors::{AppError, FormatError};
use lyricsync::subtitle_processor::{parse_timestamp, Cue, CueTrack, SubtitleSource};
use crate::common;

/// Test timestamp parsing
#[test]
fn test_parse_timestamp_withCommaMillis_shouldReturnExactSeconds() {
    assert_eq!(parse_timestamp("00:01:02,500"), Some(62.5));
    assert_eq!(parse_timestamp("01:00:00,000"), Some(3600.0));
    assert_eq!(parse_timestamp("00:00:03.250"), Some(3.25));
}

#[test]
fn test_parse_timestamp_withNonNumericSegment_shouldReturnNone() {
    assert_eq!(parse_timestamp("00:00:xx,000"), None);
    assert_eq!(parse_timestamp("00:aa:01,000"), None);
    assert_eq!(parse_timestamp("00:00"), None);
    assert_eq!(parse_timestamp(""), None);
}

#[test]
fn test_format_timestamp_shouldRenderSrtStyle() {
    assert_eq!(Cue::format_timestamp(62.5), "00:01:02,500");
    assert_eq!(Cue::format_timestamp(5025.678), "01:23:45,678");
}

/// Test the two-cue example track
#[test]
fn test_parse_withTwoBlocks_shouldProduceTwoCues() -> Result<()> {
    let track = CueTrack::parse(common::TWO_CUE_SRT)?;

    assert_eq!(track.len(), 2);
    assert_eq!(track.cues()[0], Cue::new(1, 1.0, 2.0, "Hello world"));
    assert_eq!(track.cues()[1], Cue::new(2, 3.0, 4.0, "Goodbye"));

    Ok(())
}

#[test]
fn test_parse_withTrailingBlankLines_shouldNotAddEmptyCue() -> Result<()> {
    let content = format!("{}\n\n\n   \n\n", common::THREE_CUE_SRT);
    let track = CueTrack::parse(&content)?;

    assert_eq!(track.len(), 3);
    Ok(())
}

#[test]
fn test_parse_withWellFormedTrack_shouldKeepIndicesAndRanges() -> Result<()> {
    let track = CueTrack::parse(common::THREE_CUE_SRT)?;

    let indices: Vec<u32> = track.iter().map(|cue| cue.sequence_index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert!(track.iter().all(|cue| cue.start_time <= cue.end_time));

    Ok(())
}

#[test]
fn test_parse_withWindowsLineEndingsAndExtraBlankLines_shouldNormalize() -> Result<()> {
    let content = "\u{feff}\r\n1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst line\r\nSecond line\r\n\r\n\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nNext\r\n";
    let track = CueTrack::parse(content)?;

    assert_eq!(track.len(), 2);
    assert_eq!(track.cues()[0].text, "First line\nSecond line");
    assert_eq!(track.cues()[1].text, "Next");

    Ok(())
}

#[test]
fn test_parse_withCueSettingsAfterEnd_shouldIgnoreSettings() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:02,000 X1:10 X2:20\nPositioned\n";
    let track = CueTrack::parse(content)?;

    assert_eq!(track.cues()[0].end_time, 2.0);
    Ok(())
}

#[test]
fn test_parse_withOverlappingCues_shouldKeepSourceOrder() -> Result<()> {
    let content = "1\n00:00:05,000 --> 00:00:08,000\nLater\n\n2\n00:00:01,000 --> 00:00:06,000\nEarlier\n";
    let track = CueTrack::parse(content)?;

    assert_eq!(track.cues()[0].text, "Later");
    assert_eq!(track.cues()[1].text, "Earlier");
    Ok(())
}

/// Test malformed input handling
#[test]
fn test_parse_withNonNumericSeconds_shouldFailWholeParse() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nOk\n\n2\n00:00:ab,000 --> 00:00:04,000\nBroken\n";
    let result = CueTrack::parse(content);

    assert_eq!(
        result,
        Err(FormatError::InvalidTimestamp { block: 2, value: "00:00:ab,000".to_string() })
    );
}

#[test]
fn test_parse_withMissingSeparator_shouldFail() {
    let content = "1\n00:00:01,000 00:00:02,000\nNo arrow\n";

    assert!(matches!(
        CueTrack::parse(content),
        Err(FormatError::MissingSeparator { block: 1, .. })
    ));
}

#[test]
fn test_parse_withNonIntegerIndex_shouldFail() {
    let content = "one\n00:00:01,000 --> 00:00:02,000\nText\n";

    assert_eq!(
        CueTrack::parse(content),
        Err(FormatError::InvalidIndex { block: 1, value: "one".to_string() })
    );
}

#[test]
fn test_parse_withZeroIndex_shouldFail() {
    let content = "0\n00:00:01,000 --> 00:00:02,000\nText\n";

    assert!(matches!(CueTrack::parse(content), Err(FormatError::InvalidIndex { .. })));
}

#[test]
fn test_parse_withDuplicateIndex_shouldFail() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nA\n\n1\n00:00:03,000 --> 00:00:04,000\nB\n";

    assert_eq!(
        CueTrack::parse(content),
        Err(FormatError::DuplicateIndex { block: 2, index: 1 })
    );
}

#[test]
fn test_parse_withInvertedRange_shouldFail() {
    let content = "1\n00:00:05,000 --> 00:00:02,000\nBackwards\n";

    assert_eq!(CueTrack::parse(content), Err(FormatError::InvertedRange { block: 1 }));
}

#[test]
fn test_parse_withMissingTextOrTiming_shouldFail() {
    assert_eq!(
        CueTrack::parse("1\n00:00:01,000 --> 00:00:02,000\n"),
        Err(FormatError::EmptyText { block: 1 })
    );
    assert_eq!(CueTrack::parse("1\n"), Err(FormatError::MissingTiming { block: 1 }));
}

#[test]
fn test_parse_withBlankInput_shouldFail() {
    assert_eq!(CueTrack::parse(""), Err(FormatError::Empty));
    assert_eq!(CueTrack::parse("\r\n\r\n  \n"), Err(FormatError::Empty));
}

/// Test lookups on a parsed track
#[test]
fn test_find_at_shouldUseClosedWindows() -> Result<()> {
    let track = CueTrack::parse(common::TWO_CUE_SRT)?;

    assert_eq!(track.find_at(1.0).map(|c| c.sequence_index), Some(1));
    assert_eq!(track.find_at(2.0).map(|c| c.sequence_index), Some(1));
    assert_eq!(track.find_at(2.5), None);
    assert_eq!(track.find_at(0.0), None);
    assert_eq!(track.find_at(f64::NAN), None);
    assert_eq!(track.position_of(2), Some(1));
    assert_eq!(track.end_time(), 4.0);

    Ok(())
}

#[test]
fn test_cue_display_shouldFormatAsSrtBlock() {
    let cue = Cue::new(3, 5.0, 10.0, "Test subtitle");
    let mut output = String::new();
    write!(output, "{}", cue).unwrap();

    assert_eq!(output, "3\n00:00:05,000 --> 00:00:10,000\nTest subtitle\n\n");
}

/// Test subtitle sources
#[test]
fn test_subtitle_source_fromFile_shouldLoadTrack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "lyrics.srt")?;

    let track = SubtitleSource::File(path.clone()).load_track()?;
    assert_eq!(track.len(), 3);

    let same = CueTrack::from_file(&path)?;
    assert_eq!(track, same);

    Ok(())
}

#[test]
fn test_subtitle_source_withMissingFile_shouldReturnFileError() {
    let source = SubtitleSource::File("does/not/exist.srt".into());

    let err = source.load_track().unwrap_err();
    assert!(matches!(
        err,
        AppError::File(ref msg) if msg.contains("Failed to read file") && msg.contains("exist.srt")
    ));
}

#[test]
fn test_subtitle_source_withMalformedInline_shouldReturnFormatError() {
    let source = SubtitleSource::Inline("1\nnot a timing line\ntext\n".to_string());

    let err = source.load_track().unwrap_err();
    assert!(matches!(err, AppError::Format(FormatError::MissingSeparator { .. })));
    assert!(err.to_string().contains("Subtitle track unavailable"));
}
