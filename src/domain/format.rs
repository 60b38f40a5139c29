//! Subtitle format detection (SRT / WebVTT)
//!
//! Only the head of the file is inspected: a WebVTT file must open with the
//! `WEBVTT` header, an SRT file with a numeric cue index followed by a
//! `HH:MM:SS,mmm --> HH:MM:SS,mmm` timing line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const VTT_HEADER: &str = "WEBVTT";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// The two subtitle formats we accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleKind {
    Srt,
    Vtt,
}

impl SubtitleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitleKind::Srt => "srt",
            SubtitleKind::Vtt => "vtt",
        }
    }
}

impl fmt::Display for SubtitleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown subtitle kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for SubtitleKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "srt" => Ok(SubtitleKind::Srt),
            "vtt" => Ok(SubtitleKind::Vtt),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Classify subtitle text. `None` means the format is unknown.
pub fn determine_subtitle_kind(text: &str) -> Option<SubtitleKind> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

    if text.starts_with(VTT_HEADER) {
        return Some(SubtitleKind::Vtt);
    }

    // Leading blank lines are common in hand-edited SRT files
    let mut lines = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .skip_while(|line| line.trim().is_empty());

    let index = lines.next()?;
    let timing = lines.next()?;

    if is_cue_index(index) && is_srt_timing_line(timing) {
        Some(SubtitleKind::Srt)
    } else {
        None
    }
}

pub fn is_valid_subtitle_file(text: &str) -> bool {
    determine_subtitle_kind(text).is_some()
}

fn is_cue_index(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// `HH:MM:SS,mmm --> HH:MM:SS,mmm`, optionally followed by cue settings
fn is_srt_timing_line(line: &str) -> bool {
    let Some((start, rest)) = line.trim().split_once(" --> ") else {
        return false;
    };

    let end = rest.split_whitespace().next().unwrap_or("");

    is_srt_timestamp(start.trim_end()) && is_srt_timestamp(end)
}

fn is_srt_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 12 {
        return false;
    }

    bytes.iter().enumerate().all(|(i, b)| match i {
        2 | 5 => *b == b':',
        8 => *b == b',',
        _ => b.is_ascii_digit(),
    })
}
