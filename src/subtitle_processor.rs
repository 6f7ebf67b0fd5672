use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::{warn, debug};
use serde::{Deserialize, Serialize};
use crate::errors::{AppError, FormatError};
use crate::file_utils::FileManager;

// @module: SRT subtitle parsing into timed cues

// @const: Single SRT timestamp, comma or dot before the milliseconds
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2}(?:[,.]\d+)?)$").expect("timestamp pattern is valid")
});

/// Parse one `HH:MM:SS,mmm` timestamp into seconds.
///
/// Returns `None` when any segment is not numeric.
pub fn parse_timestamp(timestamp: &str) -> Option<f64> {
    let caps = TIMESTAMP_REGEX.captures(timestamp.trim())?;

    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().replace(',', ".").parse().ok()?;

    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

// @struct: Single timed subtitle entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    // @field: 1-based order of appearance
    pub sequence_index: u32,

    // @field: Start time in seconds
    pub start_time: f64,

    // @field: End time in seconds
    pub end_time: f64,

    // @field: Cue text, may contain line breaks
    pub text: String,
}

impl Cue {
    /// Build a cue from its parts as given, without range or text checks
    pub fn new(sequence_index: u32, start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Cue {
            sequence_index,
            start_time,
            end_time,
            text: text.into(),
        }
    }

    // @creates: Validated cue
    // @validates: Ordered non-negative time range and non-empty text
    pub fn new_validated(sequence_index: u32, start_time: f64, end_time: f64, text: &str, block: usize) -> Result<Self, FormatError> {
        if !start_time.is_finite() || !end_time.is_finite() || start_time < 0.0 || end_time < start_time {
            return Err(FormatError::InvertedRange { block });
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(FormatError::EmptyText { block });
        }

        Ok(Cue {
            sequence_index,
            start_time,
            end_time,
            text: trimmed_text.to_string(),
        })
    }

    /// Whether the closed window `[start_time, end_time]` covers the position
    pub fn contains(&self, position: f64) -> bool {
        self.start_time <= position && position <= self.end_time
    }

    /// Length of the cue window in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
    pub fn format_timestamp(seconds: f64) -> String {
        let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let millis = total_ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.sequence_index)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_time),
            Self::format_timestamp(self.end_time)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered cues of one subtitle track, kept in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CueTrack {
    cues: Vec<Cue>,
}

impl CueTrack {
    /// Build a track from already-validated cues
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        CueTrack { cues }
    }

    /// Parse SRT text into a track.
    ///
    /// Line endings are normalized, runs of blank lines count as a single
    /// separator and empty blocks are dropped. Text lines are joined with `\n`.
    /// Any malformed block fails the whole parse.
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let normalized = Self::normalize(raw);
        let blocks = Self::split_blocks(&normalized);

        if blocks.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut seen = HashSet::with_capacity(blocks.len());
        let mut cues = Vec::with_capacity(blocks.len());

        for (i, lines) in blocks.iter().enumerate() {
            let block = i + 1;
            let cue = Self::parse_block(block, lines)?;
            if !seen.insert(cue.sequence_index) {
                return Err(FormatError::DuplicateIndex { block, index: cue.sequence_index });
            }
            cues.push(cue);
        }

        let overlap_count = cues
            .windows(2)
            .filter(|pair| pair[0].end_time > pair[1].start_time)
            .count();
        if overlap_count > 0 {
            warn!("Found {} overlapping or out-of-order subtitle cues", overlap_count);
        }

        debug!("Parsed {} subtitle cues", cues.len());
        Ok(CueTrack { cues })
    }

    /// Read and parse an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = SubtitleSource::File(path.as_ref().to_path_buf()).read()?;
        Ok(Self::parse(&content)?)
    }

    fn normalize(raw: &str) -> String {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        raw.replace("\r\n", "\n")
            .replace('\r', "\n")
            .trim()
            .to_string()
    }

    fn split_blocks(normalized: &str) -> Vec<Vec<&str>> {
        let mut blocks = Vec::new();
        let mut current = Vec::new();

        for line in normalized.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                continue;
            }
            current.push(line);
        }

        if !current.is_empty() {
            blocks.push(current);
        }

        blocks
    }

    fn parse_block(block: usize, lines: &[&str]) -> Result<Cue, FormatError> {
        let index_line = lines.first().map(|l| l.trim()).unwrap_or_default();
        let sequence_index = match index_line.parse::<u32>() {
            Ok(index) if index > 0 => index,
            _ => {
                return Err(FormatError::InvalidIndex {
                    block,
                    value: index_line.to_string(),
                })
            }
        };

        let timing = lines.get(1).ok_or(FormatError::MissingTiming { block })?;
        let (start_raw, end_raw) = timing
            .split_once("-->")
            .ok_or_else(|| FormatError::MissingSeparator {
                block,
                line: timing.to_string(),
            })?;

        // Cue settings may follow the end timestamp
        let end_raw = end_raw.split_whitespace().next().unwrap_or_default();

        let start_time = parse_timestamp(start_raw).ok_or_else(|| FormatError::InvalidTimestamp {
            block,
            value: start_raw.trim().to_string(),
        })?;
        let end_time = parse_timestamp(end_raw).ok_or_else(|| FormatError::InvalidTimestamp {
            block,
            value: end_raw.to_string(),
        })?;

        let text = lines[2..]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");

        Cue::new_validated(sequence_index, start_time, end_time, &text, block)
    }

    /// Number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether the track has no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// All cues in source order
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Cue at a position in the track
    pub fn get(&self, position: usize) -> Option<&Cue> {
        self.cues.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    /// First cue, in track order, whose window covers the playback position
    pub fn find_at(&self, seconds: f64) -> Option<&Cue> {
        if !seconds.is_finite() {
            return None;
        }
        self.cues.iter().find(|cue| cue.contains(seconds))
    }

    /// Position in the track of the cue with the given sequence index
    pub fn position_of(&self, sequence_index: u32) -> Option<usize> {
        self.cues.iter().position(|cue| cue.sequence_index == sequence_index)
    }

    /// Final cue in track order
    pub fn last(&self) -> Option<&Cue> {
        self.cues.last()
    }

    /// Latest end time of any cue, 0.0 for an empty track
    pub fn end_time(&self) -> f64 {
        self.cues.iter().map(|cue| cue.end_time).fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a CueTrack {
    type Item = &'a Cue;
    type IntoIter = std::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

impl fmt::Display for CueTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        writeln!(f, "Ends at: {}", Cue::format_timestamp(self.end_time()))?;
        Ok(())
    }
}

/// Where the subtitle text for a session comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SubtitleSource {
    /// SRT file on disk
    File(PathBuf),
    /// SRT text provided directly
    Inline(String),
}

impl SubtitleSource {
    /// Fetch the raw subtitle text
    pub fn read(&self) -> Result<String, AppError> {
        match self {
            Self::File(path) => FileManager::read_to_string(path)
                .map_err(|e| AppError::File(format!("{:#}", e))),
            Self::Inline(text) => Ok(text.clone()),
        }
    }

    /// Fetch and parse the track
    pub fn load_track(&self) -> Result<CueTrack, AppError> {
        let content = self.read()?;
        Ok(CueTrack::parse(&content)?)
    }

    /// Short label for logging
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline(text) => format!("<inline, {} bytes>", text.len()),
        }
    }
}

impl fmt::Display for SubtitleSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
